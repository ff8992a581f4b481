//! stemma-core - Lyric editing for choir scores
//!
//! Batch operations over the lyrics of a multi-staff score:
//!
//! - Search and replace of hyphenated syllable sequences, preserving the
//!   case of each first letter
//! - Copying lyrics from the top staff onto the staves below it
//! - TSV export and import of every syllable
//! - A word-text view of one staff for quick proofreading and re-entry
//!
//! # Architecture
//!
//! The operations are written against two host traits, [`Timeline`] for
//! reading events and [`EditHost`] for scoped edits, so they can drive any
//! score model. [`Score`] is the bundled JSON-backed implementation. Every
//! operation writes through a [`LyricWriter`], which commits all changes as
//! one undo step or rolls them back on error.
//!
//! # Example
//!
//! ```no_run
//! use stemma_core::{search_and_replace, CancelToken, ReplaceOptions, Score};
//!
//! let mut score = Score::load("mass.json".as_ref())?;
//! let report = search_and_replace(&mut score, "mi-ti", "mi-tä", ReplaceOptions::default(), &CancelToken::new())?;
//! println!("{} replacements", report.windows);
//! score.save("mass.json".as_ref())?;
//! # Ok::<(), stemma_core::Error>(())
//! ```

pub mod cancel;
pub mod case;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod replace;
pub mod score;
pub mod selection;
pub mod timeline;
pub mod transfer;
pub mod tsv;
pub mod words;
pub mod writer;

// Re-export main types
pub use cancel::CancelToken;
pub use case::adapt_case;
pub use error::{Error, PatternKind, Result};
pub use matcher::{MatchMode, MatchWindow, Matcher};
pub use pattern::Pattern;
pub use replace::{search_and_replace, ReplaceOptions, ReplaceReport};
pub use score::{Color, EventKind, HyphenationRole, NoteEvent, Score, Staff, Syllable, Tick, VOICES};
pub use selection::Selection;
pub use timeline::{Cursor, EditHost, EventRef, Timeline};
pub use transfer::{copy_lyrics_from_top, TransferReport};
pub use tsv::{export_tsv, import_tsv, ImportOptions, ImportReport, TsvRecord};
pub use words::{apply_words, parse_words, render_words, WordSlot, WordsOptions, WordsReport};
pub use writer::LyricWriter;
