// Character classes of stems, flexes and raw tokens

/// Paradigm boundary inside a stem or a flex.
pub const BOUNDARY: char = '.';

/// Morpheme break inside a stem. Dropped from the surface, shown as `-`
/// in the glossed form.
pub const MORPH_BREAK: char = '&';

/// Characters that never belong to the literal part of a stem.
const NON_LITERAL: &[char] = &[' ', '.', '(', ')', '[', ']', '<', '>', '|', '~', '&'];

/// Characters that may remain unconsumed in a flex part once the word ends.
const PLACEHOLDER: &[char] = &['.', '<', '>', '[', ']', '~', '|'];

/// Stripped from both ends of a token before analysis.
const TOKEN_TRIM: &[char] = &[
    '-', '=', '<', '>', '[', ']', '/', '(', ')', ':', ';', '.', ',', '_', '!', '?', '*',
];

/// Tokens made of these characters only are punctuation.
const PUNCTUATION: &[char] = &[
    '.', ',', ':', ';', '!', '?', '-', '–', '—', '(', ')', '[', ']', '"', '\'', '«', '»', '„',
    '“', '”', '…', '/',
];

#[inline]
pub fn is_literal(ch: char) -> bool {
    !NON_LITERAL.contains(&ch)
}

#[inline]
pub fn is_placeholder(ch: char) -> bool {
    PLACEHOLDER.contains(&ch)
}

/// Strip leading and trailing punctuation from a raw token.
pub fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| TOKEN_TRIM.contains(&c))
}

pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| PUNCTUATION.contains(&c))
}

/// Locate the first run of literal characters of a stem pattern.
///
/// Returns `(offset, length)` with the length capped at `max_len`, or `None`
/// when the pattern has no literal characters at all.
pub fn literal_key(pattern: &[char], max_len: usize) -> Option<(usize, usize)> {
    let offset = pattern.iter().position(|&c| is_literal(c))?;
    let len = pattern[offset..]
        .iter()
        .take(max_len)
        .take_while(|&&c| is_literal(c))
        .count();
    Some((offset, len))
}

/// Surface form of a stem fragment.
pub fn remove_morph_breaks(fragment: &str) -> String {
    fragment.chars().filter(|&c| c != MORPH_BREAK).collect()
}

/// Glossed form of a stem fragment.
pub fn replace_morph_breaks(fragment: &str) -> String {
    fragment.replace(MORPH_BREAK, "-")
}

/// Literal surface of a whole stem pattern (boundaries and breaks removed).
pub fn stem_surface(pattern: &str) -> String {
    pattern.chars().filter(|&c| is_literal(c)).collect()
}
