//! TSV interchange of syllables.
//!
//! One record per line, no header:
//!
//! ```text
//! tick<TAB>staff<TAB>voice<TAB>verse<TAB>role<TAB>text
//! ```
//!
//! `verse` is 1-based on the wire. Import only edits syllables that
//! already exist; it never creates a verse slot.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::score::{Color, HyphenationRole, Tick, VOICES};
use crate::timeline::{EditHost, EventRef, Timeline};
use crate::writer::LyricWriter;
use std::fmt::Write as _;

/// One syllable on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvRecord {
    pub tick: Tick,
    pub staff: usize,
    pub voice: usize,
    /// 0-based verse
    pub verse: usize,
    pub role: HyphenationRole,
    pub text: String,
}

impl TsvRecord {
    /// Parse one line.
    ///
    /// Returns `Ok(None)` for lines that are ignored (blank or fewer than
    /// six fields) and `Err` with a reason for malformed records.
    pub fn parse_line(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }
        let fields: Vec<&str> = line.splitn(6, '\t').collect();
        let [tick, staff, voice, verse, role, text] = fields[..] else {
            return Ok(None);
        };

        let number = |name: &str, value: &str| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid {} '{}'", name, value))
        };
        let index = |name: &str, value: &str| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid {} '{}'", name, value))
        };

        let verse = index("verse", verse)?;
        if verse == 0 {
            return Err("verse numbers start at 1".to_string());
        }
        Ok(Some(Self {
            tick: number("tick", tick)?,
            staff: index("staff", staff)?,
            voice: index("voice", voice)?,
            verse: verse - 1,
            role: role.trim().parse()?,
            text: text.to_string(),
        }))
    }

    fn write_line(&self, out: &mut String) {
        let text: String = self
            .text
            .chars()
            .map(|c| if matches!(c, '\t' | '\r' | '\n') { ' ' } else { c })
            .collect();
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.tick,
            self.staff,
            self.voice,
            self.verse + 1,
            self.role,
            text
        );
    }
}

/// Every syllable of the score, staff by staff, voice by voice, verse by verse.
pub fn records<T: Timeline + ?Sized>(timeline: &T) -> Vec<TsvRecord> {
    let mut out = Vec::new();
    for staff in 0..timeline.staff_count() {
        for voice in 0..VOICES {
            let events = timeline.events(staff, voice);
            let verses = events.iter().map(|e| e.verse_count()).max().unwrap_or(0);
            for verse in 0..verses {
                for event in events {
                    if let Some(syllable) = event.syllable(verse) {
                        out.push(TsvRecord {
                            tick: event.tick,
                            staff,
                            voice,
                            verse,
                            role: syllable.role,
                            text: syllable.text.clone(),
                        });
                    }
                }
            }
        }
    }
    out
}

/// Render the whole score as TSV.
pub fn export_tsv<T: Timeline + ?Sized>(timeline: &T) -> String {
    let mut out = String::new();
    for record in records(timeline) {
        record.write_line(&mut out);
    }
    out
}

/// Options for [`import_tsv`].
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Color set on every syllable the import changes
    pub highlight: Option<Color>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            highlight: Some(Color::HIGHLIGHT),
        }
    }
}

/// What an import run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Well-formed records read
    pub records: usize,
    /// Syllables changed
    pub updates: usize,
    /// Malformed lines and records that address no existing syllable
    pub skipped: usize,
}

/// Apply edited TSV text back onto the score in one edit scope.
pub fn import_tsv<H: EditHost + ?Sized>(
    host: &mut H,
    input: &str,
    options: ImportOptions,
    cancel: &CancelToken,
) -> Result<ImportReport> {
    cancel.check()?;
    let mut writer = LyricWriter::open(host)?;
    let mut report = ImportReport::default();

    for (number, line) in input.lines().enumerate() {
        cancel.check()?;
        let record = match TsvRecord::parse_line(line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(reason) => {
                log::warn!("Skipping TSV line {}: {}", number + 1, reason);
                report.skipped += 1;
                continue;
            }
        };
        report.records += 1;

        let Some(index) = writer.timeline().find_at(record.staff, record.voice, record.tick) else {
            log::debug!(
                "TSV line {}: no event at staff {} voice {} tick {}",
                number + 1,
                record.staff,
                record.voice,
                record.tick
            );
            report.skipped += 1;
            continue;
        };
        let at = EventRef::new(record.staff, record.voice, index);
        let has_slot = writer
            .timeline()
            .event(at)
            .is_some_and(|e| e.is_chord() && e.syllable(record.verse).is_some());
        if !has_slot {
            log::debug!(
                "TSV line {}: no syllable at verse {} on tick {}",
                number + 1,
                record.verse + 1,
                record.tick
            );
            report.skipped += 1;
            continue;
        }

        if writer.update(at, record.verse, &record.text, record.role, options.highlight) {
            report.updates += 1;
        }
    }

    writer.commit()?;
    log::info!(
        "Imported {} TSV records: {} updates, {} skipped",
        report.records,
        report.updates,
        report.skipped
    );
    Ok(report)
}
