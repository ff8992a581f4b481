//! Host-facing contracts and the timeline cursor.
//!
//! The lyric engine never owns a score. It reads one through [`Timeline`]
//! and mutates it only inside a scope opened on an [`EditHost`]. Positions
//! are addressed by [`EventRef`] (staff, voice, event index), so a
//! [`Cursor`] is a plain `Copy` value: snapshotting and restoring one is
//! free, and several cursors can read the same timeline side by side.

use crate::error::Result;
use crate::score::{NoteEvent, Tick, VOICES};

/// Address of one event: staff, voice and index into that voice's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventRef {
    pub staff: usize,
    pub voice: usize,
    pub index: usize,
}

impl EventRef {
    pub fn new(staff: usize, voice: usize, index: usize) -> Self {
        Self { staff, voice, index }
    }
}

/// Read access to a score's timeline, one random-access slice per (staff, voice).
pub trait Timeline {
    /// Number of staves in the score.
    fn staff_count(&self) -> usize;

    /// Events of one voice sorted by tick. Out-of-range staves or voices
    /// yield an empty slice.
    fn events(&self, staff: usize, voice: usize) -> &[NoteEvent];

    /// Mutable access to one event. Only the lyric writer calls this.
    fn event_mut(&mut self, at: EventRef) -> Option<&mut NoteEvent>;

    /// Look up an event by address.
    fn event(&self, at: EventRef) -> Option<&NoteEvent> {
        self.events(at.staff, at.voice).get(at.index)
    }

    /// Index of the event sitting exactly at `tick`, if any.
    fn find_at(&self, staff: usize, voice: usize, tick: Tick) -> Option<usize> {
        self.events(staff, voice)
            .binary_search_by_key(&tick, |e| e.tick)
            .ok()
    }

    /// True if no voice of the staff has any event.
    fn is_staff_empty(&self, staff: usize) -> bool {
        (0..VOICES).all(|voice| self.events(staff, voice).is_empty())
    }

    /// The score's final position: the latest event end across all staves.
    /// Events without a duration count as one tick long.
    fn end_tick(&self) -> Tick {
        (0..self.staff_count())
            .flat_map(|staff| (0..VOICES).map(move |voice| (staff, voice)))
            .filter_map(|(staff, voice)| self.events(staff, voice).last())
            .map(|e| e.tick + e.duration.max(1))
            .max()
            .unwrap_or(0)
    }
}

/// Transactional mutation scope offered by the host.
///
/// At most one scope is open at a time. Everything written between
/// `begin_edit` and `end_edit` becomes visible (and undoable) as one step;
/// `rollback_edit` discards it.
pub trait EditHost: Timeline {
    fn begin_edit(&mut self) -> Result<()>;
    fn end_edit(&mut self) -> Result<()>;
    fn rollback_edit(&mut self) -> Result<()>;
}

/// Position over one staff/voice's events.
///
/// The cursor holds no borrow; every read takes the timeline explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    staff: usize,
    voice: usize,
    index: usize,
}

impl Cursor {
    /// Cursor at the first event of the given staff and voice.
    pub fn new(staff: usize, voice: usize) -> Self {
        Self { staff, voice, index: 0 }
    }

    /// Move to the first event at or after `tick`.
    pub fn rewind_to<T: Timeline + ?Sized>(&mut self, timeline: &T, tick: Tick) {
        self.index = timeline
            .events(self.staff, self.voice)
            .partition_point(|e| e.tick < tick);
    }

    /// Step to the next event. Returns false once the cursor is past the end.
    pub fn advance<T: Timeline + ?Sized>(&mut self, timeline: &T) -> bool {
        let len = timeline.events(self.staff, self.voice).len();
        if self.index < len {
            self.index += 1;
        }
        self.index < len
    }

    /// The event under the cursor, or None past the end.
    pub fn current<'a, T: Timeline + ?Sized>(&self, timeline: &'a T) -> Option<&'a NoteEvent> {
        timeline.events(self.staff, self.voice).get(self.index)
    }

    pub fn tick<T: Timeline + ?Sized>(&self, timeline: &T) -> Option<Tick> {
        self.current(timeline).map(|e| e.tick)
    }

    /// Address of the event under the cursor.
    pub fn at(&self) -> EventRef {
        EventRef::new(self.staff, self.voice, self.index)
    }

    /// Move to an explicit event index.
    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }

    pub fn snapshot(&self) -> Cursor {
        *self
    }

    pub fn restore(&mut self, snapshot: Cursor) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Score, Staff};

    fn score() -> Score {
        Score::new().with_staff(Staff::new("S").with_voice(
            0,
            vec![
                NoteEvent::chord(0),
                NoteEvent::rest(480),
                NoteEvent::chord(960).with_duration(480),
            ],
        ))
    }

    #[test]
    fn test_cursor_walks_voice() {
        let score = score();
        let mut cursor = Cursor::new(0, 0);
        let mut ticks = vec![];
        loop {
            match cursor.tick(&score) {
                Some(t) => ticks.push(t),
                None => break,
            }
            if !cursor.advance(&score) {
                break;
            }
        }
        assert_eq!(ticks, vec![0, 480, 960]);
        assert!(cursor.current(&score).is_none());
    }

    #[test]
    fn test_cursor_rewind_and_snapshot() {
        let score = score();
        let mut cursor = Cursor::new(0, 0);
        cursor.rewind_to(&score, 481);
        assert_eq!(cursor.tick(&score), Some(960));

        let saved = cursor.snapshot();
        assert!(!cursor.advance(&score));
        cursor.restore(saved);
        assert_eq!(cursor.tick(&score), Some(960));
    }

    #[test]
    fn test_empty_voice() {
        let score = score();
        let mut cursor = Cursor::new(0, 3);
        assert!(cursor.current(&score).is_none());
        assert!(!cursor.advance(&score));
        assert!(Cursor::new(5, 0).current(&score).is_none());
    }

    #[test]
    fn test_end_tick_and_find() {
        let score = score();
        assert_eq!(score.end_tick(), 1440);
        assert_eq!(score.find_at(0, 0, 480), Some(1));
        assert_eq!(score.find_at(0, 0, 481), None);
        assert_eq!(Score::new().end_tick(), 0);
    }
}
