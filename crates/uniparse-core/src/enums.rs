// Shared enums: GlossType, Position, CliticSide, and the parser limits

use serde::{Deserialize, Serialize};

/// Role of one flex part when a wordform is rebuilt and glossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlossType {
    /// Part with neither surface nor gloss.
    Empty,
    /// Ordinary affix, glossed as `-x-`.
    Affix,
    /// Infix, glossed as `<x>`.
    Infix,
    /// Reduplicant attached to the right of the stem (`-x~`).
    ReduplRight,
    /// Reduplicant attached to the left of the stem (`~x-`).
    ReduplLeft,
    /// Stem boundary `.`.
    Stem,
    /// Forced stem boundary `[.]`.
    StemForced,
    /// Stem specifier `[x]`, glossed as a suffix of the stem gloss.
    StemSpec,
    /// Continuation `<.>` into a subsequent paradigm.
    NextFlex,
    /// Slot `<+>` filled by an incorporated stem.
    Incorporation,
    /// Leading marker of derivational inflexions that may precede a bare stem.
    StartWithSelf,
}

impl GlossType {
    /// `.` or `[.]`.
    #[inline]
    pub fn is_stem_boundary(self) -> bool {
        matches!(self, GlossType::Stem | GlossType::StemForced)
    }

    /// Parts that carry no surface material of their own.
    #[inline]
    pub fn is_marker(self) -> bool {
        matches!(
            self,
            GlossType::Stem
                | GlossType::StemForced
                | GlossType::NextFlex
                | GlossType::Incorporation
                | GlossType::StartWithSelf
        )
    }

    /// Parts that receive a slice of the inflexion gloss.
    #[inline]
    pub fn takes_gloss(self) -> bool {
        matches!(
            self,
            GlossType::Affix | GlossType::Infix | GlossType::ReduplRight | GlossType::ReduplLeft
        )
    }
}

/// Where an inflexion may stand in a chain of paradigms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// May end a word only through its continuation.
    NonFinal,
    /// Must end the word.
    Final,
    /// No restriction.
    #[default]
    Both,
}

/// Which side of its host a clitic attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CliticSide {
    Proclitic,
    Enclitic,
    /// Recorded in the grammar but never stripped by the splitter.
    Other,
}

// ---------------------------------------------------------------------------
// Parser limits
// ---------------------------------------------------------------------------

/// Placeholder written into a word where an edit operation substituted or
/// inserted a character. It matches any character on either side.
pub const WILDCARD: char = '•';

/// Glossed rendering of an affix without surface material.
pub const EMPTY_FLEX_MARK: &str = "∅";

/// Tokens longer than this are never analyzed.
pub const MAX_TOKEN_LENGTH: usize = 512;

/// Stem index keys are cut to this many characters.
pub const MAX_STEM_START_LEN: usize = 6;

/// Nesting limit of transparent (empty) inflexions in one branch.
pub const MAX_EMPTY_INFLEXIONS: usize = 2;

/// A corrected stem key shorter than this is discarded.
pub const MIN_REPLACEMENT_STEM_LEN: usize = 5;

/// Words shorter than this are never matched with edits.
pub const MIN_REPLACEMENT_WORD_LEN: usize = 6;

/// How many times a single inflexion or derivation may repeat in one branch.
pub const RECURS_LIMIT: usize = 2;

/// Maximum number of derivation paradigms in one analysis.
pub const MAX_DERIVATIONS: usize = 2;
