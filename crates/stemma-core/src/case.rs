//! First-letter case transfer from a matched syllable to its replacement.

/// Give `replacement` the first-letter case of `source`.
///
/// `source` is the normalized score text. If it starts with an uppercase
/// character the replacement's first character is uppercased, otherwise it
/// is lowercased. The rest of the replacement is kept verbatim.
pub fn adapt_case(source: &str, replacement: &str) -> String {
    let upper = source.chars().next().is_some_and(char::is_uppercase);
    let mut chars = replacement.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::with_capacity(replacement.len());
    if upper {
        out.extend(first.to_uppercase());
    } else {
        out.extend(first.to_lowercase());
    }
    out.push_str(chars.as_str());
    out
}
