//! "Search and replace lyrics" command.
//!
//! Scans every staff and voice left to right. At each starting event the
//! verses present on that event are tried in increasing order and the first
//! complete window wins. After a replacement the scan resumes on the event
//! following the window, so accepted windows never overlap.

use crate::cancel::CancelToken;
use crate::error::{Error, PatternKind, Result};
use crate::matcher::{MatchMode, MatchWindow, Matcher};
use crate::pattern::Pattern;
use crate::score::VOICES;
use crate::timeline::{Cursor, EditHost};
use crate::writer::LyricWriter;

/// Options for [`search_and_replace`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceOptions {
    pub mode: MatchMode,
}

/// What a replacement run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Accepted match windows
    pub windows: usize,
    /// Syllables whose text changed
    pub rewritten: usize,
    /// Syllables removed because the replace pattern was shorter
    pub removed: usize,
    /// Staves with at least one accepted window
    pub staves: usize,
}

/// Replace every occurrence of the `search` syllable sequence with `replace`.
///
/// Both patterns are validated before the score is touched. All writes
/// happen in one edit scope; on error or cancellation nothing is kept.
pub fn search_and_replace<H: EditHost + ?Sized>(
    host: &mut H,
    search: &str,
    replace: &str,
    options: ReplaceOptions,
    cancel: &CancelToken,
) -> Result<ReplaceReport> {
    let search = Pattern::parse(search, PatternKind::Search)?;
    let replace = Pattern::parse(replace, PatternKind::Replace)?;

    if host.staff_count() == 0 {
        return Err(Error::NoSelection("the score has no staves".to_string()));
    }
    if let Some(staff) = (0..host.staff_count()).find(|&s| host.is_staff_empty(s)) {
        return Err(Error::NoContent(staff));
    }
    cancel.check()?;

    let matcher = Matcher::new(&search, &replace, options.mode);
    let mut writer = LyricWriter::open(host)?;
    let mut report = ReplaceReport::default();

    for staff in 0..writer.timeline().staff_count() {
        cancel.check()?;
        let windows_before = report.windows;

        for voice in 0..VOICES {
            let mut cursor = Cursor::new(staff, voice);
            while let Some(event) = cursor.current(writer.timeline()) {
                cancel.check()?;
                let max_verses = if event.is_chord() { event.verse_count() } else { 0 };
                let window = (0..max_verses)
                    .find_map(|verse| matcher.match_at(writer.timeline(), cursor, verse));

                match window.as_ref().and_then(|w| w.last().map(|last| (w, last))) {
                    Some((window, last)) => {
                        apply_window(&mut writer, window, &mut report);
                        cursor.seek(last.index + 1);
                    }
                    None => {
                        cursor.advance(writer.timeline());
                    }
                }
            }
        }

        if report.windows > windows_before {
            report.staves += 1;
        }
    }

    writer.commit()?;
    log::info!(
        "Replaced '{}' with '{}': {} matches on {} staves ({} syllables rewritten, {} removed)",
        search,
        replace,
        report.windows,
        report.staves,
        report.rewritten,
        report.removed
    );
    Ok(report)
}

fn apply_window<H: EditHost + ?Sized>(
    writer: &mut LyricWriter<'_, H>,
    window: &MatchWindow,
    report: &mut ReplaceReport,
) {
    report.windows += 1;
    let mut last_kept = None;
    let mut removed = 0;

    for entry in &window.entries {
        match &entry.replacement {
            Some(text) => {
                if writer.set_text(entry.at, entry.verse, text) {
                    report.rewritten += 1;
                }
                last_kept = Some(entry.at);
            }
            None => {
                if writer.remove(entry.at, entry.verse).is_some() {
                    removed += 1;
                }
            }
        }
    }

    // The word now ends on the last kept syllable.
    if removed > 0 {
        if let Some(at) = last_kept {
            let role = writer
                .timeline()
                .event(at)
                .and_then(|e| e.syllable(window.verse))
                .map(|s| s.role);
            if let Some(role) = role {
                writer.set_role(at, window.verse, role.closed());
            }
        }
    }
    report.removed += removed;
}
