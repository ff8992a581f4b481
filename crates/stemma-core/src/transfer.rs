//! "Copy lyrics from top staff" command.
//!
//! The reference staff's syllables are harvested once. Every target staff
//! is then cleared and re-attached on exactly matching ticks. Remaining
//! lyric-less chords lying between two matched ticks may take one unused
//! reference syllable from the same interval, earliest gap first. Tie and
//! slur continuations are never gap-filled.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::score::{HyphenationRole, Syllable, Tick, VOICES};
use crate::selection::Selection;
use crate::timeline::{Cursor, EditHost, EventRef, Timeline};
use crate::writer::LyricWriter;

/// A syllable read from the reference staff.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Harvested {
    tick: Tick,
    verse: usize,
    text: String,
    role: HyphenationRole,
}

impl Harvested {
    fn to_syllable(&self) -> Syllable {
        Syllable::new(self.text.clone(), self.verse, self.role)
    }
}

/// What a transfer run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Target staves processed
    pub staves: usize,
    /// Syllables attached on an exactly matching tick
    pub exact: usize,
    /// Syllables attached to gap chords
    pub gap_fills: usize,
    /// Syllables removed from the targets before re-attaching
    pub cleared: usize,
}

/// Chords of one staff (all voices) in `[start, end)`, voice by voice.
fn chords_in_range<T: Timeline + ?Sized>(
    timeline: &T,
    staff: usize,
    start: Tick,
    end: Tick,
) -> Vec<(EventRef, Tick)> {
    let mut chords = Vec::new();
    for voice in 0..VOICES {
        let mut cursor = Cursor::new(staff, voice);
        cursor.rewind_to(timeline, start);
        while let Some(event) = cursor.current(timeline) {
            if event.tick >= end {
                break;
            }
            if event.is_chord() {
                chords.push((cursor.at(), event.tick));
            }
            cursor.advance(timeline);
        }
    }
    chords
}

fn harvest<T: Timeline + ?Sized>(timeline: &T, staff: usize, start: Tick, end: Tick) -> Vec<Harvested> {
    let mut entries: Vec<Harvested> = chords_in_range(timeline, staff, start, end)
        .into_iter()
        .filter_map(|(at, tick)| timeline.event(at).map(|e| (tick, e)))
        .flat_map(|(tick, event)| {
            event.lyrics().iter().map(move |s| Harvested {
                tick,
                verse: s.verse,
                text: s.text.clone(),
                role: s.role,
            })
        })
        .collect();
    // Stable: voices keep their order on equal ticks.
    entries.sort_by_key(|e| e.tick);
    entries
}

/// Copy lyrics from the selection's first staff onto every staff below it
/// up to the selection's last staff.
///
/// All target staves are rewritten inside one edit scope.
pub fn copy_lyrics_from_top<H: EditHost + ?Sized>(
    host: &mut H,
    selection: &Selection,
    cancel: &CancelToken,
) -> Result<TransferReport> {
    let (start, end) = selection.resolve(&*host)?;
    let reference = selection.first_staff;
    cancel.check()?;

    let harvested = harvest(&*host, reference, start, end);
    log::debug!(
        "Harvested {} syllables from staff {} in {}..{}",
        harvested.len(),
        reference,
        start,
        end
    );
    if selection.last_staff == reference {
        log::warn!("Selection has no staff below staff {}; nothing to copy", reference);
    }

    let mut writer = LyricWriter::open(host)?;
    let mut report = TransferReport::default();
    for staff in reference + 1..=selection.last_staff {
        cancel.check()?;
        transfer_to(&mut writer, staff, start, end, &harvested, &mut report);
        report.staves += 1;
    }
    writer.commit()?;

    log::info!(
        "Copied lyrics from staff {} to {} staves: {} exact, {} gap fills, {} cleared",
        reference,
        report.staves,
        report.exact,
        report.gap_fills,
        report.cleared
    );
    Ok(report)
}

fn transfer_to<H: EditHost + ?Sized>(
    writer: &mut LyricWriter<'_, H>,
    staff: usize,
    start: Tick,
    end: Tick,
    harvested: &[Harvested],
    report: &mut TransferReport,
) {
    let chords = chords_in_range(writer.timeline(), staff, start, end);
    let mut consumed = vec![false; harvested.len()];
    let mut matched: Vec<Tick> = Vec::new();
    let mut gaps: Vec<(EventRef, Tick)> = Vec::new();

    for &(at, tick) in &chords {
        let removed = writer.clear(at);
        let continued = writer.timeline().event(at).is_some_and(|e| e.continuation);
        if removed > 0 {
            report.cleared += removed;
            matched.push(tick);
        } else if !continued {
            gaps.push((at, tick));
        }
    }

    for &(at, tick) in &chords {
        let first = harvested.partition_point(|e| e.tick < tick);
        let mut attached = false;
        for (i, entry) in harvested.iter().enumerate().skip(first) {
            if entry.tick != tick {
                break;
            }
            if consumed[i] {
                continue;
            }
            let slot_taken = writer
                .timeline()
                .event(at)
                .map_or(true, |e| e.syllable(entry.verse).is_some());
            if !slot_taken && writer.attach(at, entry.to_syllable()) {
                consumed[i] = true;
                attached = true;
                report.exact += 1;
            }
        }
        if attached {
            matched.push(tick);
        }
    }

    matched.sort_unstable();
    // Earlier gaps first across all voices; voice order breaks ties.
    gaps.sort_by_key(|&(_, tick)| tick);

    for &(at, tick) in &gaps {
        if writer.timeline().event(at).is_some_and(|e| e.has_lyrics()) {
            continue;
        }
        let before = matched.iter().rev().find(|&&m| m < tick).copied();
        let after = matched.iter().find(|&&m| m > tick).copied();
        let (Some(before), Some(after)) = (before, after) else {
            log::debug!("Gap at tick {} on staff {} has no matched neighbour on both sides", tick, staff);
            continue;
        };
        let candidate = harvested
            .iter()
            .enumerate()
            .find(|(i, e)| !consumed[*i] && e.tick > before && e.tick < after)
            .map(|(i, _)| i);
        match candidate {
            Some(i) if writer.attach(at, harvested[i].to_syllable()) => {
                consumed[i] = true;
                report.gap_fills += 1;
            }
            _ => {
                log::debug!(
                    "No unused syllable between ticks {} and {} for gap at {} on staff {}",
                    before,
                    after,
                    tick,
                    staff
                );
            }
        }
    }
}
