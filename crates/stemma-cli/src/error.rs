//! Error types for the stemma command

use thiserror::Error;

/// Result type alias for configuration handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating, reading or creating the config file
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
