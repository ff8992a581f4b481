//! Score data model.
//!
//! A score is a list of staves, each holding four independent voices. A
//! voice is a tick-ordered list of [`NoteEvent`]s, and each chord event can
//! carry one [`Syllable`] per verse.
//!
//! The lyric engine only reads and rewrites syllables. Event identity and
//! timing are owned by whoever built the score.

mod color;
mod file;

pub use color::Color;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Integer position on the score timeline.
pub type Tick = i64;

/// Number of voices per staff.
pub const VOICES: usize = 4;

/// Position of a syllable within a multi-syllable word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HyphenationRole {
    /// A whole word on one note
    #[default]
    Single,
    /// First syllable of a word
    Begin,
    /// Inner syllable of a word
    Middle,
    /// Last syllable of a word
    End,
}

impl HyphenationRole {
    pub const ALL: [HyphenationRole; 4] = [
        HyphenationRole::Single,
        HyphenationRole::Begin,
        HyphenationRole::Middle,
        HyphenationRole::End,
    ];

    /// Name used in the TSV interchange format.
    pub fn as_str(self) -> &'static str {
        match self {
            HyphenationRole::Single => "single",
            HyphenationRole::Begin => "begin",
            HyphenationRole::Middle => "middle",
            HyphenationRole::End => "end",
        }
    }

    /// True if the word continues on the next syllable.
    pub fn continues(self) -> bool {
        matches!(self, HyphenationRole::Begin | HyphenationRole::Middle)
    }

    /// The role this syllable takes when the word is cut short after it.
    pub fn closed(self) -> Self {
        match self {
            HyphenationRole::Begin | HyphenationRole::Single => HyphenationRole::Single,
            HyphenationRole::Middle | HyphenationRole::End => HyphenationRole::End,
        }
    }

    /// Role of a syllable that does or does not start and end its word.
    pub fn from_bounds(starts_word: bool, ends_word: bool) -> Self {
        match (starts_word, ends_word) {
            (true, true) => HyphenationRole::Single,
            (true, false) => HyphenationRole::Begin,
            (false, false) => HyphenationRole::Middle,
            (false, true) => HyphenationRole::End,
        }
    }
}

impl std::fmt::Display for HyphenationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HyphenationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HyphenationRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown hyphenation role '{}'", s))
    }
}

/// A unit of sung text attached to one verse of a chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllable {
    pub text: String,
    /// 0-based verse index
    pub verse: usize,
    #[serde(default)]
    pub role: HyphenationRole,
    /// Display-only highlight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Syllable {
    pub fn new(text: impl Into<String>, verse: usize, role: HyphenationRole) -> Self {
        Self {
            text: text.into(),
            verse,
            role,
            color: None,
        }
    }

    /// A single-syllable word on verse 0.
    pub fn single(text: impl Into<String>) -> Self {
        Self::new(text, 0, HyphenationRole::Single)
    }
}

/// Kind of a timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A note group (one or more notes sounding together)
    Chord,
    Rest,
}

/// A point on one voice's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub tick: Tick,
    #[serde(default)]
    pub duration: Tick,
    pub kind: EventKind,
    /// Held over from the previous chord by a tie or slur. Such a chord
    /// sings no syllable of its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continuation: bool,
    /// At most one syllable per verse, sorted by verse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lyrics: Vec<Syllable>,
}

impl NoteEvent {
    pub fn chord(tick: Tick) -> Self {
        Self {
            tick,
            duration: 0,
            kind: EventKind::Chord,
            continuation: false,
            lyrics: Vec::new(),
        }
    }

    pub fn rest(tick: Tick) -> Self {
        Self {
            kind: EventKind::Rest,
            ..Self::chord(tick)
        }
    }

    pub fn with_duration(mut self, duration: Tick) -> Self {
        self.duration = duration;
        self
    }

    /// Mark the chord as a tie or slur continuation (builder form).
    pub fn continued(mut self) -> Self {
        self.continuation = self.is_chord();
        self
    }

    /// Attach a syllable (builder form). Rests never carry lyrics.
    pub fn with_lyric(mut self, syllable: Syllable) -> Self {
        if self.is_chord() {
            self.set_syllable(syllable);
        }
        self
    }

    pub fn is_chord(&self) -> bool {
        self.kind == EventKind::Chord
    }

    /// A chord that may start a syllable of its own.
    pub fn takes_syllable(&self) -> bool {
        self.is_chord() && !self.continuation
    }

    /// All syllables, sorted by verse.
    pub fn lyrics(&self) -> &[Syllable] {
        &self.lyrics
    }

    pub fn has_lyrics(&self) -> bool {
        !self.lyrics.is_empty()
    }

    /// Syllable at the given verse, if any.
    pub fn syllable(&self, verse: usize) -> Option<&Syllable> {
        self.lyrics.iter().find(|s| s.verse == verse)
    }

    pub(crate) fn syllable_mut(&mut self, verse: usize) -> Option<&mut Syllable> {
        self.lyrics.iter_mut().find(|s| s.verse == verse)
    }

    /// Number of verse slots addressable from this event: one past the
    /// highest verse carrying a syllable, or 0 without lyrics.
    pub fn verse_count(&self) -> usize {
        self.lyrics.last().map_or(0, |s| s.verse + 1)
    }

    /// Insert or replace the syllable at its verse. Returns the replaced one.
    pub(crate) fn set_syllable(&mut self, syllable: Syllable) -> Option<Syllable> {
        match self.lyrics.binary_search_by_key(&syllable.verse, |s| s.verse) {
            Ok(i) => Some(std::mem::replace(&mut self.lyrics[i], syllable)),
            Err(i) => {
                self.lyrics.insert(i, syllable);
                None
            }
        }
    }

    pub(crate) fn remove_syllable(&mut self, verse: usize) -> Option<Syllable> {
        let i = self.lyrics.iter().position(|s| s.verse == verse)?;
        Some(self.lyrics.remove(i))
    }

    /// Remove every syllable; returns how many were removed.
    pub(crate) fn clear_lyrics(&mut self) -> usize {
        let n = self.lyrics.len();
        self.lyrics.clear();
        n
    }

    /// Restore the sorted-by-verse invariant after deserialization.
    fn normalize(&mut self) {
        if !self.is_chord() {
            self.continuation = false;
            self.lyrics.clear();
            return;
        }
        self.lyrics.sort_by_key(|s| s.verse);
        self.lyrics.dedup_by_key(|s| s.verse);
    }
}

/// One staff of the score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    voices: [Vec<NoteEvent>; VOICES],
}

impl Staff {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voices: Default::default(),
        }
    }

    /// Set the events of one voice (builder form). Events are sorted by tick.
    pub fn with_voice(mut self, voice: usize, events: Vec<NoteEvent>) -> Self {
        if let Some(slot) = self.voices.get_mut(voice) {
            *slot = events;
            slot.sort_by_key(|e| e.tick);
        }
        self
    }

    /// Events of a voice; empty for an out-of-range voice.
    pub fn voice(&self, voice: usize) -> &[NoteEvent] {
        self.voices.get(voice).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn voice_mut(&mut self, voice: usize) -> Option<&mut Vec<NoteEvent>> {
        self.voices.get_mut(voice)
    }

    pub fn is_empty(&self) -> bool {
        self.voices.iter().all(Vec::is_empty)
    }

    fn normalize(&mut self) {
        for voice in &mut self.voices {
            voice.sort_by_key(|e| e.tick);
            voice.iter_mut().for_each(NoteEvent::normalize);
        }
    }
}

/// In-memory score with single-level edit scopes and an undo history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub staves: Vec<Staff>,
    /// Staves as they were when the open edit began.
    #[serde(skip)]
    pending: Option<Vec<Staff>>,
    /// One entry per committed edit, most recent last.
    #[serde(skip)]
    history: Vec<Vec<Staff>>,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_staff(mut self, staff: Staff) -> Self {
        self.staves.push(staff);
        self
    }

    /// True while an edit scope is open.
    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of committed edits that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Revert the most recent committed edit. Returns false if there is none
    /// or an edit is still open.
    pub fn undo(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        match self.history.pop() {
            Some(staves) => {
                self.staves = staves;
                true
            }
            None => false,
        }
    }

    fn normalize(&mut self) {
        self.staves.iter_mut().for_each(Staff::normalize);
    }
}
