//! Configuration file support for stemma
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/stemma/config.toml`
//! - macOS: `~/Library/Application Support/stemma/config.toml`
//! - Windows: `%APPDATA%\stemma\config.toml`

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use stemma_core::{Color, ImportOptions, MatchMode, ReplaceOptions, Tick, WordsOptions};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r##"# stemma configuration file

[replace]
# "rematch": also match the replacement text, so re-running a
# replacement changes nothing. "strict": match the search text only.
mode = "rematch"

[import]
# Color marking syllables changed by import-tsv
highlight_color = "#ff0000"

# Set to false to leave colors alone on import
highlight = true

[words]
# Ticks per measure for line breaks in `stemma words` (0 = one line)
measure_ticks = 0

[log]
# Default log level; RUST_LOG overrides it
level = "info"
"##;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search and replace settings
    pub replace: ReplaceSettings,
    /// TSV import settings
    pub import: ImportSettings,
    /// Word text settings
    pub words: WordsSettings,
    /// Logging settings
    pub log: LogSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(Error::Config(_)) => Self::default(),
            Err(e) => {
                eprintln!("Ignoring unreadable config file: {}", e);
                Self::default()
            }
        }
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "stemma") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        Self::write_default_to(&path)?;
        Ok(path)
    }

    fn write_default_to(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        Ok(())
    }

    pub fn replace_options(&self) -> ReplaceOptions {
        ReplaceOptions {
            mode: self.replace.mode,
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            highlight: self.import.highlight.then_some(self.import.highlight_color),
        }
    }

    pub fn words_options(&self, voice: usize, verse: usize) -> WordsOptions {
        WordsOptions {
            voice,
            verse,
            measure_ticks: Some(self.words.measure_ticks).filter(|&m| m > 0),
        }
    }
}

/// Search and replace settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaceSettings {
    /// How score text is matched against the patterns
    pub mode: MatchMode,
}

/// TSV import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Color set on changed syllables
    pub highlight_color: Color,
    /// Whether changed syllables are colored at all
    pub highlight: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            highlight_color: Color::HIGHLIGHT,
            highlight: true,
        }
    }
}

/// Word text settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordsSettings {
    /// Ticks per measure, 0 for no line breaks
    pub measure_ticks: Tick,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when RUST_LOG is unset
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.replace.mode, MatchMode::Rematch);
        assert_eq!(config.import.highlight_color, Color::HIGHLIGHT);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.words_options(0, 0).measure_ticks, None);
    }

    #[test]
    fn test_default_file_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = Config::default();
        config.replace.mode = MatchMode::Strict;
        config.import.highlight_color = Color::rgb(0, 128, 255);
        config.words.measure_ticks = 1920;
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.words_options(1, 2).measure_ticks, Some(1920));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[replace]\nmode = \"strict\"\n").unwrap();
        assert_eq!(parsed.replace.mode, MatchMode::Strict);
        assert_eq!(parsed.import, ImportSettings::default());
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(toml::from_str::<Config>("[import]\nhighlight_color = \"red\"\n").is_err());
    }

    #[test]
    fn test_highlight_switch() {
        let mut config = Config::default();
        assert_eq!(config.import_options().highlight, Some(Color::HIGHLIGHT));
        config.import.highlight = false;
        assert_eq!(config.import_options().highlight, None);
    }

    #[test]
    fn test_default_config_parses_with_highlight_color() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed.import.highlight_color, Color::rgb(255, 0, 0));
        assert!(parsed.import.highlight);
        assert_eq!(parsed.log.level, "info");
    }

    #[test]
    fn test_default_file_written_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::write_default_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_edited_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.replace, ReplaceSettings::default());
    }
}
