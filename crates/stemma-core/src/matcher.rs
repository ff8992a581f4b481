//! Sequence matcher.
//!
//! Aligns the lyric text of consecutive qualifying events against a
//! search [`Pattern`]. An event qualifies for a window on verse `v` when it
//! is a chord carrying a syllable at `v`; rests and chords without that
//! verse are stepped over and do not consume a token. The first qualifying
//! event whose text does not match ends the attempt.

use crate::case::adapt_case;
use crate::pattern::{eq_ignore_case, normalize, Pattern};
use crate::timeline::{Cursor, EventRef, Timeline};
use serde::{Deserialize, Serialize};

/// How score text is compared against pattern tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Match the search token or the paired replace token. Running the
    /// same replacement twice is then a no-op.
    #[default]
    Rematch,
    /// Match the search token only.
    Strict,
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rematch" => Ok(MatchMode::Rematch),
            "strict" => Ok(MatchMode::Strict),
            _ => Err(format!("unknown match mode '{}', expected rematch or strict", s)),
        }
    }
}

/// One matched syllable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEntry {
    pub at: EventRef,
    pub verse: usize,
    /// Normalized score text that matched.
    pub source: String,
    /// Case-adapted text to write, or None when the replace pattern has no
    /// token left for this position and the syllable goes away.
    pub replacement: Option<String>,
}

/// A complete match: exactly one entry per search token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWindow {
    pub verse: usize,
    pub entries: Vec<MatchEntry>,
}

impl MatchWindow {
    /// The last matched event.
    pub fn last(&self) -> Option<EventRef> {
        self.entries.last().map(|e| e.at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pairs a search pattern with its replacement.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'p> {
    search: &'p Pattern,
    replace: &'p Pattern,
    mode: MatchMode,
}

impl<'p> Matcher<'p> {
    pub fn new(search: &'p Pattern, replace: &'p Pattern, mode: MatchMode) -> Self {
        Self { search, replace, mode }
    }

    /// Replace text paired with search token `index`.
    ///
    /// The last search token also takes every surplus replace token,
    /// joined with `-`.
    fn paired_token(&self, index: usize) -> Option<String> {
        let tokens = self.replace.tokens();
        if index >= tokens.len() {
            return None;
        }
        if index + 1 == self.search.len() {
            Some(tokens[index..].join("-"))
        } else {
            Some(tokens[index].clone())
        }
    }

    fn hits(&self, text: &str, index: usize, paired: Option<&str>) -> bool {
        let Some(token) = self.search.get(index) else {
            return false;
        };
        if text == token || eq_ignore_case(text, token) {
            return true;
        }
        self.mode == MatchMode::Rematch && paired.is_some_and(|p| eq_ignore_case(text, p))
    }

    /// Try to match the whole search pattern on `verse`, starting exactly at
    /// the cursor's event. Returns None for partial or failed windows.
    pub fn match_at<T: Timeline + ?Sized>(
        &self,
        timeline: &T,
        start: Cursor,
        verse: usize,
    ) -> Option<MatchWindow> {
        let wanted = self.search.len();
        let mut cursor = start.snapshot();
        let mut entries: Vec<MatchEntry> = Vec::with_capacity(wanted);

        while entries.len() < wanted {
            let Some(event) = cursor.current(timeline) else {
                log::debug!(
                    "Partial match of '{}' at {:?} ran off the timeline after {} of {} syllables",
                    self.search,
                    start.at(),
                    entries.len(),
                    wanted
                );
                return None;
            };

            let syllable = if event.is_chord() { event.syllable(verse) } else { None };
            match syllable {
                Some(syllable) => {
                    let index = entries.len();
                    let text = normalize(&syllable.text);
                    let paired = self.paired_token(index);
                    if !self.hits(text, index, paired.as_deref()) {
                        if index > 0 {
                            log::debug!(
                                "Discarding partial match of '{}' at {:?}: '{}' does not match '{}'",
                                self.search,
                                start.at(),
                                text,
                                self.search.get(index).unwrap_or_default()
                            );
                        }
                        return None;
                    }
                    entries.push(MatchEntry {
                        at: cursor.at(),
                        verse,
                        source: text.to_string(),
                        replacement: paired.map(|p| adapt_case(text, &p)),
                    });
                }
                // A window must begin on the starting event itself.
                None if entries.is_empty() => return None,
                None => {}
            }

            if entries.len() < wanted {
                cursor.advance(timeline);
            }
        }

        Some(MatchWindow { verse, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternKind;
    use crate::score::{HyphenationRole, NoteEvent, Score, Staff, Syllable};

    fn pattern(s: &str) -> Pattern {
        Pattern::parse(s, PatternKind::Search).unwrap()
    }

    fn lyric(text: &str, role: HyphenationRole) -> Syllable {
        Syllable::new(text, 0, role)
    }

    fn score(events: Vec<NoteEvent>) -> Score {
        Score::new().with_staff(Staff::new("S").with_voice(0, events))
    }

    #[test]
    fn test_match_with_case_fallback() {
        let score = score(vec![
            NoteEvent::chord(0).with_lyric(lyric("Mi", HyphenationRole::Begin)),
            NoteEvent::chord(480).with_lyric(lyric("-ti", HyphenationRole::End)),
        ]);
        let (search, replace) = (pattern("mi-ti"), pattern("mi-tä"));
        let matcher = Matcher::new(&search, &replace, MatchMode::Rematch);

        let window = matcher.match_at(&score, Cursor::new(0, 0), 0).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.entries[0].source, "Mi");
        assert_eq!(window.entries[0].replacement.as_deref(), Some("Mi"));
        assert_eq!(window.entries[1].source, "ti");
        assert_eq!(window.entries[1].replacement.as_deref(), Some("tä"));
        assert_eq!(window.last(), Some(EventRef::new(0, 0, 1)));
    }

    #[test]
    fn test_rests_and_other_verses_are_skipped() {
        let score = score(vec![
            NoteEvent::chord(0).with_lyric(lyric("a", HyphenationRole::Begin)),
            NoteEvent::rest(240),
            NoteEvent::chord(480).with_lyric(Syllable::new("zz", 1, HyphenationRole::Single)),
            NoteEvent::chord(720).with_lyric(lyric("b", HyphenationRole::End)),
        ]);
        let (search, replace) = (pattern("a-b"), pattern("c-d"));
        let matcher = Matcher::new(&search, &replace, MatchMode::Rematch);

        let window = matcher.match_at(&score, Cursor::new(0, 0), 0).unwrap();
        let indices: Vec<usize> = window.entries.iter().map(|e| e.at.index).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn test_mismatch_aborts_without_skipping() {
        let score = score(vec![
            NoteEvent::chord(0).with_lyric(lyric("a", HyphenationRole::Single)),
            NoteEvent::chord(480).with_lyric(lyric("x", HyphenationRole::Single)),
            NoteEvent::chord(960).with_lyric(lyric("b", HyphenationRole::Single)),
        ]);
        let (search, replace) = (pattern("a-b"), pattern("c-d"));
        let matcher = Matcher::new(&search, &replace, MatchMode::Rematch);
        assert!(matcher.match_at(&score, Cursor::new(0, 0), 0).is_none());
    }

    #[test]
    fn test_partial_window_at_end_is_rejected() {
        let score = score(vec![NoteEvent::chord(0).with_lyric(lyric("a", HyphenationRole::Begin))]);
        let (search, replace) = (pattern("a-b"), pattern("c-d"));
        let matcher = Matcher::new(&search, &replace, MatchMode::Rematch);
        assert!(matcher.match_at(&score, Cursor::new(0, 0), 0).is_none());
    }

    #[test]
    fn test_window_must_start_on_cursor_event() {
        let score = score(vec![
            NoteEvent::rest(0),
            NoteEvent::chord(480).with_lyric(lyric("a", HyphenationRole::Single)),
        ]);
        let (search, replace) = (pattern("a"), pattern("c"));
        let matcher = Matcher::new(&search, &replace, MatchMode::Rematch);
        assert!(matcher.match_at(&score, Cursor::new(0, 0), 0).is_none());
    }

    #[test]
    fn test_strict_mode_ignores_replacement_text() {
        let score = score(vec![
            NoteEvent::chord(0).with_lyric(lyric("c", HyphenationRole::Begin)),
            NoteEvent::chord(480).with_lyric(lyric("d", HyphenationRole::End)),
        ]);
        let (search, replace) = (pattern("a-b"), pattern("c-d"));

        let rematch = Matcher::new(&search, &replace, MatchMode::Rematch);
        assert!(rematch.match_at(&score, Cursor::new(0, 0), 0).is_some());

        let strict = Matcher::new(&search, &replace, MatchMode::Strict);
        assert!(strict.match_at(&score, Cursor::new(0, 0), 0).is_none());
    }

    #[test]
    fn test_uneven_patterns() {
        let score = score(vec![
            NoteEvent::chord(0).with_lyric(lyric("Hal", HyphenationRole::Begin)),
            NoteEvent::chord(480).with_lyric(lyric("le", HyphenationRole::End)),
        ]);

        let (search, shorter) = (pattern("hal-le"), pattern("hei"));
        let window = Matcher::new(&search, &shorter, MatchMode::Rematch)
            .match_at(&score, Cursor::new(0, 0), 0)
            .unwrap();
        assert_eq!(window.entries[0].replacement.as_deref(), Some("Hei"));
        assert_eq!(window.entries[1].replacement, None);

        let longer = pattern("hal-le-lu-ja");
        let window = Matcher::new(&search, &longer, MatchMode::Rematch)
            .match_at(&score, Cursor::new(0, 0), 0)
            .unwrap();
        assert_eq!(window.entries[1].replacement.as_deref(), Some("le-lu-ja"));
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("Strict".parse::<MatchMode>(), Ok(MatchMode::Strict));
        assert_eq!("rematch".parse::<MatchMode>(), Ok(MatchMode::Rematch));
        assert!("fuzzy".parse::<MatchMode>().is_err());
    }
}
