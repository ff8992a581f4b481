//! Staff and tick range an operation applies to.

use crate::error::{Error, Result};
use crate::score::Tick;
use crate::timeline::Timeline;

/// A rectangular selection: a run of staves and a tick range `[start, end)`.
///
/// An `end` of 0 means "to the end of the score".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub first_staff: usize,
    pub last_staff: usize,
    pub start: Tick,
    pub end: Tick,
}

impl Selection {
    pub fn new(first_staff: usize, last_staff: usize, start: Tick, end: Tick) -> Self {
        Self {
            first_staff,
            last_staff,
            start,
            end,
        }
    }

    /// Whole-score range over the given staves.
    pub fn staves(first_staff: usize, last_staff: usize) -> Self {
        Self::new(first_staff, last_staff, 0, 0)
    }

    /// Whole-score range over one staff.
    pub fn staff(staff: usize) -> Self {
        Self::staves(staff, staff)
    }

    pub fn with_range(mut self, start: Tick, end: Tick) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Check the selection against the score and resolve its tick range.
    pub fn resolve<T: Timeline + ?Sized>(&self, timeline: &T) -> Result<(Tick, Tick)> {
        if self.first_staff > self.last_staff {
            return Err(Error::NoSelection(format!(
                "staff range {}..={} is reversed",
                self.first_staff, self.last_staff
            )));
        }
        if self.last_staff >= timeline.staff_count() {
            return Err(Error::NoSelection(format!(
                "staff {} does not exist (the score has {} staves)",
                self.last_staff,
                timeline.staff_count()
            )));
        }
        let end = if self.end == 0 { timeline.end_tick() } else { self.end };
        if self.start >= end {
            return Err(Error::NoSelection(format!("tick range {}..{} is empty", self.start, end)));
        }
        Ok((self.start, end))
    }

    /// The selected staff, for operations that work on exactly one.
    pub fn single_staff(&self) -> Result<usize> {
        if self.first_staff == self.last_staff {
            Ok(self.first_staff)
        } else {
            Err(Error::StaffMismatch {
                first: self.first_staff,
                last: self.last_staff,
            })
        }
    }
}
