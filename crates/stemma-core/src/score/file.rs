//! Host implementation for the in-memory [`Score`] and its JSON file form.

use super::{NoteEvent, Score};
use crate::error::{Error, Result};
use crate::timeline::{EditHost, EventRef, Timeline};
use std::fs;
use std::path::Path;

impl Score {
    /// Parse a score from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut score: Score = serde_json::from_str(json)?;
        score.normalize();
        Ok(score)
    }

    /// Serialize the score to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a score file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let score = Self::from_json(&content)?;
        log::debug!("Loaded {} staves from {}", score.staves.len(), path.display());
        Ok(score)
    }

    /// Write the score file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Timeline for Score {
    fn staff_count(&self) -> usize {
        self.staves.len()
    }

    fn events(&self, staff: usize, voice: usize) -> &[NoteEvent] {
        self.staves.get(staff).map_or(&[], |s| s.voice(voice))
    }

    fn event_mut(&mut self, at: EventRef) -> Option<&mut NoteEvent> {
        self.staves
            .get_mut(at.staff)?
            .voice_mut(at.voice)?
            .get_mut(at.index)
    }
}

impl EditHost for Score {
    fn begin_edit(&mut self) -> Result<()> {
        if self.pending.is_some() {
            return Err(Error::EditInProgress);
        }
        self.pending = Some(self.staves.clone());
        Ok(())
    }

    fn end_edit(&mut self) -> Result<()> {
        let before = self.pending.take().ok_or(Error::NoEditOpen)?;
        if before != self.staves {
            self.history.push(before);
        }
        Ok(())
    }

    fn rollback_edit(&mut self) -> Result<()> {
        self.staves = self.pending.take().ok_or(Error::NoEditOpen)?;
        Ok(())
    }
}
