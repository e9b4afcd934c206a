// Lexemes and their stem realizations

use std::collections::BTreeSet;

use uniparse_core::character::BOUNDARY;

use super::{LexemeId, ParadigmId};

/// Address of one sub-lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubLexRef {
    pub lexeme: LexemeId,
    pub sub: u32,
}

/// What a sub-lexeme looks like when incorporated into another word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncorporationForm {
    pub stem: String,
    pub gramm: String,
    pub gloss: String,
}

/// One stem variant of a lexeme attached to one paradigm.
#[derive(Debug, Clone)]
pub struct SubLexeme {
    pub lexeme: LexemeId,
    /// Stem as written in the grammar.
    pub stem: String,
    /// Stem as walked by the engine; always contains a boundary.
    pub pattern: Vec<char>,
    pub paradigm: ParadigmId,
    /// Stem slots this variant fills.
    pub stem_nums: BTreeSet<usize>,
    pub gloss: String,
    pub gramm: String,
    pub no_incorporation: bool,
    pub incorporation: Option<IncorporationForm>,
}

impl SubLexeme {
    pub fn pattern_string(&self) -> String {
        self.pattern.iter().collect()
    }

    pub fn starts_with_boundary(&self) -> bool {
        self.pattern.first() == Some(&BOUNDARY)
    }
}

/// A dictionary entry.
#[derive(Debug, Clone)]
pub struct Lexeme {
    pub lemma: String,
    pub subs: Vec<SubLexeme>,
    pub other_data: Vec<(String, String)>,
    pub num_stems: usize,
}

impl Lexeme {
    pub fn other(&self, field: &str) -> impl Iterator<Item = &str> {
        self.other_data
            .iter()
            .filter(move |(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }
}

/// Engine pattern of a written stem.
pub fn stem_pattern(stem: &str) -> Vec<char> {
    let mut pattern: Vec<char> = stem.chars().collect();
    if !pattern.contains(&BOUNDARY) {
        pattern.push(BOUNDARY);
    }
    pattern
}

/// Split a stem description into slots (`//`) and variants (`|`).
pub fn split_stem_slots(stem: &str) -> Vec<Vec<String>> {
    stem.split("//")
        .map(|slot| {
            slot.split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Distinct stem variants with every slot they fill.
pub fn merge_slots(slots: &[Vec<String>]) -> Vec<(String, BTreeSet<usize>)> {
    let mut merged: Vec<(String, BTreeSet<usize>)> = Vec::new();
    for (num, variants) in slots.iter().enumerate() {
        for variant in variants {
            match merged.iter_mut().find(|(stem, _)| stem == variant) {
                Some((_, nums)) => {
                    nums.insert(num);
                }
                None => merged.push((variant.clone(), BTreeSet::from([num]))),
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_appends_boundary() {
        assert_eq!(stem_pattern("test"), vec!['t', 'e', 's', 't', '.']);
        assert_eq!(stem_pattern(".test."), vec!['.', 't', 'e', 's', 't', '.']);
    }

    #[test]
    fn slots_and_variants() {
        let slots = split_stem_slots("kniga.|knig.//knizh.");
        assert_eq!(slots, vec![vec!["kniga.", "knig."], vec!["knizh."]]);
        assert_eq!(split_stem_slots("a.//"), vec![vec!["a.".to_string()], vec![]]);
    }

    #[test]
    fn shared_variants_fill_several_slots() {
        let slots = split_stem_slots("a.//b.//a.");
        let merged = merge_slots(&slots);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].0, "a.");
        assert_eq!(merged[0].1, BTreeSet::from([0, 2]));
        assert_eq!(merged[1].1, BTreeSet::from([1]));
    }
}
