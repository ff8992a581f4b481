//! Human-readable word text for one staff, voice and verse.
//!
//! Words are separated by whitespace and syllables of one word by `-`.
//! A word split across two lines keeps a trailing `-` on the first line.
//! `_` stands for a chord without a syllable. Tie and slur continuations
//! get no token at all.
//!
//! ```text
//! Ky-ri-e e-lei-
//! son _ Chri-ste
//! ```

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::pattern::normalize;
use crate::score::{HyphenationRole, NoteEvent, Syllable, Tick, VOICES};
use crate::selection::Selection;
use crate::timeline::{Cursor, EditHost, EventRef, Timeline};
use crate::writer::LyricWriter;

const SKIP: &str = "_";

/// Which lyric line the word text covers and how it is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordsOptions {
    pub voice: usize,
    /// 0-based verse
    pub verse: usize,
    /// Start a new output line whenever a chord enters a new measure of
    /// this many ticks.
    pub measure_ticks: Option<Tick>,
}

/// One chord's worth of word text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSlot {
    /// `_`: the chord carries no syllable
    Skip,
    Syllable { text: String, role: HyphenationRole },
}

/// What [`apply_words`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordsReport {
    /// Syllables written or changed
    pub assigned: usize,
    /// Syllables removed by `_`, from continuations, or because the words
    /// ran out
    pub cleared: usize,
    /// Slots left over after the last chord
    pub surplus: usize,
}

fn check_voice(options: &WordsOptions) -> Result<()> {
    if options.voice >= VOICES {
        return Err(Error::NoSelection(format!("voice {} does not exist", options.voice + 1)));
    }
    Ok(())
}

/// Chords of one staff/voice in `[start, end)`.
fn chords<T: Timeline + ?Sized>(timeline: &T, staff: usize, voice: usize, start: Tick, end: Tick) -> Vec<EventRef> {
    let mut cursor = Cursor::new(staff, voice);
    cursor.rewind_to(timeline, start);
    let mut out = Vec::new();
    while let Some(event) = cursor.current(timeline) {
        if event.tick >= end {
            break;
        }
        if event.is_chord() {
            out.push(cursor.at());
        }
        cursor.advance(timeline);
    }
    out
}

/// Render the selected staff's lyric line as word text.
pub fn render_words<T: Timeline + ?Sized>(
    timeline: &T,
    selection: &Selection,
    options: &WordsOptions,
) -> Result<String> {
    let staff = selection.single_staff()?;
    let (start, end) = selection.resolve(timeline)?;
    check_voice(options)?;
    let measure_ticks = options.measure_ticks.filter(|&m| m > 0);

    let mut lines: Vec<String> = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut measure = None;

    for at in chords(timeline, staff, options.voice, start, end) {
        let Some(event) = timeline.event(at).filter(|e| e.takes_syllable()) else {
            continue;
        };
        if let Some(length) = measure_ticks {
            let current = event.tick.div_euclid(length);
            if measure.is_some_and(|m| m != current) && !words.is_empty() {
                lines.push(words.join(" "));
                words.clear();
            }
            measure = Some(current);
        }

        let token = match event.syllable(options.verse) {
            Some(syllable) if !normalize(&syllable.text).is_empty() => {
                let mut token = normalize(&syllable.text).to_string();
                if syllable.role.continues() {
                    token.push('-');
                }
                token
            }
            _ => SKIP.to_string(),
        };
        match words.last_mut() {
            Some(word) if word.ends_with('-') && token != SKIP => word.push_str(&token),
            _ => words.push(token),
        }
    }
    if !words.is_empty() {
        lines.push(words.join(" "));
    }
    Ok(lines.join("\n"))
}

/// Split word text into one slot per chord.
pub fn parse_words(text: &str) -> Vec<WordSlot> {
    let mut slots = Vec::new();
    let mut carry = false;

    for part in text.split_whitespace() {
        if part == SKIP {
            slots.push(WordSlot::Skip);
            carry = false;
            continue;
        }
        let carry_in = carry || part.starts_with('-');
        let carry_out = part.ends_with('-');
        let pieces: Vec<&str> = part.split('-').map(str::trim).filter(|p| !p.is_empty()).collect();
        if pieces.is_empty() {
            continue;
        }
        let last = pieces.len() - 1;
        for (i, piece) in pieces.into_iter().enumerate() {
            slots.push(WordSlot::Syllable {
                text: piece.to_string(),
                role: HyphenationRole::from_bounds(i == 0 && !carry_in, i == last && !carry_out),
            });
        }
        carry = carry_out;
    }
    slots
}

/// Distribute word text over the chords of the selected staff, in order.
///
/// Each chord takes one slot. The verse is rewritten for every chord in
/// range: chords given `_` or left over after the last word lose their
/// syllable at that verse, and so do tie and slur continuations, which
/// take no slot. An existing syllable keeps its color.
pub fn apply_words<H: EditHost + ?Sized>(
    host: &mut H,
    selection: &Selection,
    options: &WordsOptions,
    text: &str,
    cancel: &CancelToken,
) -> Result<WordsReport> {
    let staff = selection.single_staff()?;
    let (start, end) = selection.resolve(&*host)?;
    check_voice(options)?;
    cancel.check()?;

    let slots = parse_words(text);
    let (targets, held): (Vec<EventRef>, Vec<EventRef>) = chords(&*host, staff, options.voice, start, end)
        .into_iter()
        .partition(|&at| host.event(at).is_some_and(NoteEvent::takes_syllable));
    let mut writer = LyricWriter::open(host)?;
    let mut report = WordsReport::default();

    for (i, &at) in targets.iter().enumerate() {
        match slots.get(i) {
            Some(WordSlot::Syllable { text, role }) => {
                let has_slot = writer
                    .timeline()
                    .event(at)
                    .is_some_and(|e| e.syllable(options.verse).is_some());
                let changed = if has_slot {
                    writer.update(at, options.verse, text, *role, None)
                } else {
                    writer.attach(at, Syllable::new(text.clone(), options.verse, *role))
                };
                if changed {
                    report.assigned += 1;
                }
            }
            Some(WordSlot::Skip) | None => {
                if writer.remove(at, options.verse).is_some() {
                    report.cleared += 1;
                }
            }
        }
    }
    for &at in &held {
        if writer.remove(at, options.verse).is_some() {
            report.cleared += 1;
        }
    }
    cancel.check()?;
    writer.commit()?;

    report.surplus = slots.len().saturating_sub(targets.len());
    if report.surplus > 0 {
        log::warn!(
            "{} syllables did not fit on the {} chords of staff {}",
            report.surplus,
            targets.len(),
            staff
        );
    }
    log::info!(
        "Applied words to staff {}: {} assigned, {} cleared",
        staff,
        report.assigned,
        report.cleared
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Color, Score, Staff};

    fn syl(text: &str, role: HyphenationRole) -> Syllable {
        Syllable::new(text, 0, role)
    }

    fn kyrie() -> Score {
        Score::new().with_staff(Staff::new("S").with_voice(
            0,
            vec![
                NoteEvent::chord(0).with_lyric(syl("Ky", HyphenationRole::Begin)),
                NoteEvent::chord(480).with_lyric(syl("ri", HyphenationRole::Middle)),
                NoteEvent::rest(960),
                NoteEvent::chord(1440).with_lyric(syl("e", HyphenationRole::End)),
                NoteEvent::chord(1920),
                NoteEvent::chord(2400).with_lyric(syl("e", HyphenationRole::Begin)),
                NoteEvent::chord(2880).with_lyric(syl("lei", HyphenationRole::End)),
            ],
        ))
    }

    fn roles(slots: &[WordSlot]) -> Vec<HyphenationRole> {
        slots
            .iter()
            .filter_map(|s| match s {
                WordSlot::Syllable { role, .. } => Some(*role),
                WordSlot::Skip => None,
            })
            .collect()
    }

    #[test]
    fn test_render_joins_syllables() {
        let text = render_words(&kyrie(), &Selection::staff(0), &WordsOptions::default()).unwrap();
        assert_eq!(text, "Ky-ri-e _ e-lei");
    }

    #[test]
    fn test_render_splits_measures() {
        let options = WordsOptions {
            measure_ticks: Some(1920),
            ..Default::default()
        };
        let text = render_words(&kyrie(), &Selection::staff(0), &options).unwrap();
        assert_eq!(text, "Ky-ri-e\n_ e-lei");

        let options = WordsOptions {
            measure_ticks: Some(960),
            ..Default::default()
        };
        let text = render_words(&kyrie(), &Selection::staff(0), &options).unwrap();
        assert_eq!(text, "Ky-ri-\ne\n_ e-\nlei");
    }

    #[test]
    fn test_parse_roles() {
        let slots = parse_words("Ky-ri-e  _ e-lei-\nson a");
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[3], WordSlot::Skip);
        assert_eq!(
            roles(&slots),
            vec![
                HyphenationRole::Begin,
                HyphenationRole::Middle,
                HyphenationRole::End,
                HyphenationRole::Begin,
                HyphenationRole::Middle,
                HyphenationRole::End,
                HyphenationRole::Single,
            ]
        );
    }

    #[test]
    fn test_render_then_apply_is_stable() {
        let mut score = kyrie();
        let before = score.staves.clone();
        let text = render_words(&score, &Selection::staff(0), &WordsOptions::default()).unwrap();
        let report =
            apply_words(&mut score, &Selection::staff(0), &WordsOptions::default(), &text, &CancelToken::new())
                .unwrap();

        assert_eq!(report.assigned, 0);
        assert_eq!(report.cleared, 0);
        assert_eq!(report.surplus, 0);
        assert_eq!(score.staves, before);
        assert_eq!(score.undo_depth(), 0);
    }

    #[test]
    fn test_apply_overwrites_clears_and_reports_surplus() {
        let mut score = kyrie();
        let report = apply_words(
            &mut score,
            &Selection::staff(0),
            &WordsOptions::default(),
            "Glo-ri _ a in ex-cel-sis",
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(report.assigned, 5);
        assert_eq!(report.cleared, 1);
        assert_eq!(report.surplus, 2);
        let texts: Vec<Option<&str>> = score
            .events(0, 0)
            .iter()
            .filter(|e| e.is_chord())
            .map(|e| e.syllable(0).map(|s| s.text.as_str()))
            .collect();
        assert_eq!(texts, vec![Some("Glo"), Some("ri"), None, Some("a"), Some("in"), Some("ex")]);
    }

    #[test]
    fn test_apply_keeps_color_and_counts_real_changes() {
        let mut score = kyrie();
        let mut marked = syl("ri", HyphenationRole::Middle);
        marked.color = Some(Color::HIGHLIGHT);
        score.staves[0] = Staff::new("S").with_voice(
            0,
            vec![
                NoteEvent::chord(0).with_lyric(syl("Ky", HyphenationRole::Begin)),
                NoteEvent::chord(480).with_lyric(marked),
                NoteEvent::chord(960).with_lyric(syl("e", HyphenationRole::End)),
            ],
        );
        let report =
            apply_words(&mut score, &Selection::staff(0), &WordsOptions::default(), "Ky-ro-e", &CancelToken::new())
                .unwrap();

        assert_eq!(report.assigned, 1);
        let edited = score.events(0, 0)[1].syllable(0).unwrap();
        assert_eq!(edited.text, "ro");
        assert_eq!(edited.color, Some(Color::HIGHLIGHT));
    }

    #[test]
    fn test_continuations_take_no_token() {
        let mut score = Score::new().with_staff(Staff::new("S").with_voice(
            0,
            vec![
                NoteEvent::chord(0).with_lyric(syl("Ky", HyphenationRole::Begin)),
                NoteEvent::chord(480).continued().with_lyric(syl("x", HyphenationRole::Single)),
                NoteEvent::chord(960).with_lyric(syl("ri", HyphenationRole::End)),
            ],
        ));
        let text = render_words(&score, &Selection::staff(0), &WordsOptions::default()).unwrap();
        assert_eq!(text, "Ky-ri");

        let report =
            apply_words(&mut score, &Selection::staff(0), &WordsOptions::default(), "Glo-ri-a", &CancelToken::new())
                .unwrap();
        assert_eq!(report.assigned, 2);
        assert_eq!(report.cleared, 1);
        assert_eq!(report.surplus, 1);
        let events = score.events(0, 0);
        assert_eq!(events[0].syllable(0).map(|s| s.text.as_str()), Some("Glo"));
        assert!(events[1].syllable(0).is_none());
        assert_eq!(events[2].syllable(0).map(|s| s.role), Some(HyphenationRole::Middle));
    }

    #[test]
    fn test_short_text_clears_remaining_chords() {
        let mut score = kyrie();
        let report =
            apply_words(&mut score, &Selection::staff(0), &WordsOptions::default(), "la", &CancelToken::new())
                .unwrap();
        assert_eq!(report.assigned, 1);
        assert_eq!(report.cleared, 4);
        assert_eq!(score.events(0, 0)[0].syllable(0).map(|s| s.role), Some(HyphenationRole::Single));
    }

    #[test]
    fn test_multi_staff_selection_rejected() {
        let mut score = kyrie().with_staff(Staff::new("A"));
        assert!(matches!(
            render_words(&score, &Selection::staves(0, 1), &WordsOptions::default()),
            Err(Error::StaffMismatch { first: 0, last: 1 })
        ));
        assert!(matches!(
            apply_words(&mut score, &Selection::staves(0, 1), &WordsOptions::default(), "x", &CancelToken::new()),
            Err(Error::StaffMismatch { .. })
        ));
        let bad_voice = WordsOptions {
            voice: 4,
            ..Default::default()
        };
        assert!(matches!(
            render_words(&score, &Selection::staff(0), &bad_voice),
            Err(Error::NoSelection(_))
        ));
    }
}
