//! Syllable tokenizer.
//!
//! A pattern is written the way a hyphenated word is sung: `mi-tä` is two
//! syllables, `hal-le-lu-ja` four. Score syllables may carry their own
//! hyphen markers (`-ti`, `hal-`), which [`normalize`] strips before any
//! comparison.

use crate::error::{Error, PatternKind, Result};

/// Strip surrounding whitespace and leading/trailing hyphen markers.
pub fn normalize(text: &str) -> &str {
    text.trim().trim_matches('-').trim()
}

/// An ordered, non-empty sequence of syllable tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<String>,
}

impl Pattern {
    /// Split a pattern string on `-`. Empty pieces (from `a--b` or a
    /// trailing hyphen) are dropped. A pattern without any token is an
    /// [`Error::EmptyPattern`].
    pub fn parse(source: &str, kind: PatternKind) -> Result<Self> {
        let tokens: Vec<String> = source
            .split('-')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tokens.is_empty() {
            return Err(Error::EmptyPattern(kind));
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a parsed pattern.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tokens.join("-"))
    }
}

/// Case-insensitive equality on normalized text.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("-ti"), "ti");
        assert_eq!(normalize("  Mi- "), "Mi");
        assert_eq!(normalize("--"), "");
        assert_eq!(normalize("a-b"), "a-b");
    }

    #[test]
    fn test_parse_tokens() {
        let p = Pattern::parse(" hal-le - lu-ja ", PatternKind::Search).unwrap();
        assert_eq!(p.tokens(), &["hal", "le", "lu", "ja"]);
        assert_eq!(p.to_string(), "hal-le-lu-ja");
    }

    #[test]
    fn test_parse_drops_empty_pieces() {
        let p = Pattern::parse("-mi--tä-", PatternKind::Replace).unwrap();
        assert_eq!(p.tokens(), &["mi", "tä"]);
    }

    #[test]
    fn test_blank_pattern_rejected() {
        assert!(matches!(
            Pattern::parse("   ", PatternKind::Search),
            Err(Error::EmptyPattern(PatternKind::Search))
        ));
        assert!(matches!(
            Pattern::parse(" - ", PatternKind::Replace),
            Err(Error::EmptyPattern(PatternKind::Replace))
        ));
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case("Tä", "tä"));
        assert!(eq_ignore_case("ÄITI", "äiti"));
        assert!(!eq_ignore_case("ti", "tä"));
    }
}
