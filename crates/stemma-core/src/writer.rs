//! Lyric writer: the single mutation path into a host score.
//!
//! A [`LyricWriter`] owns one open edit scope. All writes of a top-level
//! operation go through it and become visible together on [`commit`].
//! Dropping the writer without committing rolls the scope back, so an
//! early return with `?` never leaves a half-modified score behind.
//!
//! [`commit`]: LyricWriter::commit

use crate::error::Result;
use crate::score::{Color, HyphenationRole, NoteEvent, Syllable};
use crate::timeline::{EditHost, EventRef};

/// Scoped writer over an [`EditHost`].
pub struct LyricWriter<'a, H: EditHost + ?Sized> {
    host: &'a mut H,
    open: bool,
    changes: usize,
}

impl<'a, H: EditHost + ?Sized> LyricWriter<'a, H> {
    /// Open an edit scope on the host.
    pub fn open(host: &'a mut H) -> Result<Self> {
        host.begin_edit()?;
        Ok(Self {
            host,
            open: true,
            changes: 0,
        })
    }

    /// Read access to the score while the scope is open.
    pub fn timeline(&self) -> &H {
        &*self.host
    }

    /// Number of syllable writes so far.
    pub fn changes(&self) -> usize {
        self.changes
    }

    fn chord_mut(&mut self, at: EventRef) -> Option<&mut NoteEvent> {
        self.host.event_mut(at).filter(|e| e.is_chord())
    }

    /// Replace the text of an existing syllable. Returns true if it changed.
    pub fn set_text(&mut self, at: EventRef, verse: usize, text: &str) -> bool {
        let Some(syllable) = self.chord_mut(at).and_then(|e| e.syllable_mut(verse)) else {
            return false;
        };
        if syllable.text == text {
            return false;
        }
        syllable.text = text.to_string();
        self.changes += 1;
        true
    }

    /// Change the hyphenation role of an existing syllable.
    pub fn set_role(&mut self, at: EventRef, verse: usize, role: HyphenationRole) -> bool {
        let Some(syllable) = self.chord_mut(at).and_then(|e| e.syllable_mut(verse)) else {
            return false;
        };
        if syllable.role == role {
            return false;
        }
        syllable.role = role;
        self.changes += 1;
        true
    }

    /// Overwrite text and role of an existing syllable if either differs,
    /// marking the edited syllable with `mark`. Never creates a verse slot.
    pub fn update(
        &mut self,
        at: EventRef,
        verse: usize,
        text: &str,
        role: HyphenationRole,
        mark: Option<Color>,
    ) -> bool {
        let Some(syllable) = self.chord_mut(at).and_then(|e| e.syllable_mut(verse)) else {
            return false;
        };
        if syllable.text == text && syllable.role == role {
            return false;
        }
        syllable.text = text.to_string();
        syllable.role = role;
        if mark.is_some() {
            syllable.color = mark;
        }
        self.changes += 1;
        true
    }

    /// Attach a syllable to a chord, replacing whatever sat at its verse.
    /// Returns false for rests and missing events.
    pub fn attach(&mut self, at: EventRef, syllable: Syllable) -> bool {
        let Some(event) = self.chord_mut(at) else {
            return false;
        };
        event.set_syllable(syllable);
        self.changes += 1;
        true
    }

    /// Remove the syllable at one verse.
    pub fn remove(&mut self, at: EventRef, verse: usize) -> Option<Syllable> {
        let removed = self.host.event_mut(at)?.remove_syllable(verse)?;
        self.changes += 1;
        Some(removed)
    }

    /// Remove every syllable of an event; returns how many were removed.
    pub fn clear(&mut self, at: EventRef) -> usize {
        let removed = self.host.event_mut(at).map_or(0, NoteEvent::clear_lyrics);
        self.changes += removed;
        removed
    }

    /// Close the scope, publishing every write as one step.
    pub fn commit(mut self) -> Result<usize> {
        self.open = false;
        self.host.end_edit()?;
        Ok(self.changes)
    }

    /// Discard every write made through this writer.
    pub fn rollback(mut self) -> Result<()> {
        self.open = false;
        self.host.rollback_edit()
    }
}

impl<H: EditHost + ?Sized> Drop for LyricWriter<'_, H> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.host.rollback_edit() {
                log::warn!("Failed to roll back unfinished lyric edit: {}", e);
            }
        }
    }
}
