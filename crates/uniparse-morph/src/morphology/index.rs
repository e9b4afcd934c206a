// Stem, affix and incorporation indices over the compiled grammar

use hashbrown::HashMap;
use uniparse_core::character::literal_key;
use uniparse_fst::{EditOp, Fst, FstBuilder, FstError};

use crate::grammar::{Grammar, InflexionRef, ParadigmId, SubLexRef};

/// Payload of a stem key: the sub-lexeme and where the key starts in its
/// stem pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemEntry {
    pub sub: SubLexRef,
    pub offset: u32,
}

/// One stem placement proposed for a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemMatch {
    pub entry: StemEntry,
    pub start: usize,
    pub end: usize,
    /// Word segment after corrections, as long as the key.
    pub segment: Vec<char>,
    pub edits: Vec<EditOp>,
}

impl StemMatch {
    /// The word with the matched segment replaced by its corrected form.
    pub fn corrected_word(&self, word: &[char]) -> Vec<char> {
        let mut out = Vec::with_capacity(word.len() + self.segment.len());
        out.extend_from_slice(&word[..self.start]);
        out.extend_from_slice(&self.segment);
        out.extend_from_slice(&word[self.end..]);
        out
    }
}

/// Stem-start index.
///
/// Keys are the first run of literal characters of each stem pattern, capped
/// at `max_key_len`. Sub-lexemes without literal characters cannot be found
/// this way and are listed in [`StemIndex::pregenerate`] instead.
#[derive(Debug)]
pub struct StemIndex {
    fst: Fst<StemEntry>,
    pregenerate: Vec<SubLexRef>,
}

impl StemIndex {
    pub fn build(grammar: &Grammar, max_key_len: usize) -> Result<Self, FstError> {
        let mut builder = FstBuilder::new();
        let mut pregenerate = Vec::new();
        for (id, lexeme) in grammar.lexemes() {
            for (i, sub) in lexeme.subs.iter().enumerate() {
                let sub_ref = SubLexRef {
                    lexeme: id,
                    sub: i as u32,
                };
                match literal_key(&sub.pattern, max_key_len) {
                    Some((offset, len)) => builder.insert(
                        &sub.pattern[offset..offset + len],
                        StemEntry {
                            sub: sub_ref,
                            offset: offset as u32,
                        },
                    )?,
                    None => pregenerate.push(sub_ref),
                }
            }
        }
        log::debug!(
            "stem index: {} keys, {} sub-lexemes to pregenerate",
            builder.len(),
            pregenerate.len()
        );
        Ok(Self {
            fst: builder.build(),
            pregenerate,
        })
    }

    /// Every stem key occurring in `word` with at most `max_edits` edits.
    pub fn lookup(&self, word: &[char], max_edits: usize) -> Vec<StemMatch> {
        self.fst
            .lookup(word, max_edits)
            .into_iter()
            .map(|m| StemMatch {
                entry: *self.fst.value(m.value),
                start: m.start,
                end: m.end,
                segment: m.segment,
                edits: m.edits,
            })
            .collect()
    }

    pub fn pregenerate(&self) -> &[SubLexRef] {
        &self.pregenerate
    }
}

#[derive(Debug)]
struct AffixTable {
    anchored: Fst<u32>,
    slot: Fst<u32>,
}

/// Per-paradigm affix tables.
///
/// Each inflexion is stored under its anchored key (used once the stem is
/// behind) and under its slot key (used when a stem starts with a boundary
/// and the inflexion may come first).
#[derive(Debug, Default)]
pub struct AffixIndex {
    tables: HashMap<ParadigmId, AffixTable>,
}

impl AffixIndex {
    pub fn build(grammar: &Grammar) -> Result<Self, FstError> {
        let mut tables = HashMap::with_capacity(grammar.paradigm_count());
        for (id, paradigm) in grammar.paradigms() {
            let mut anchored = FstBuilder::with_empty_keys();
            let mut slot = FstBuilder::with_empty_keys();
            for (i, infl) in paradigm.inflexions.iter().enumerate() {
                anchored.insert(&infl.anchored_key(), i as u32)?;
                slot.insert(&infl.slot_key(), i as u32)?;
            }
            tables.insert(
                id,
                AffixTable {
                    anchored: anchored.build(),
                    slot: slot.build(),
                },
            );
        }
        Ok(Self { tables })
    }

    /// Inflexions of `paradigm` whose key is a prefix of `word[pos..]`.
    ///
    /// Returns `None` for a paradigm the index does not know.
    pub fn candidates(
        &self,
        paradigm: ParadigmId,
        word: &[char],
        pos: usize,
        slot: bool,
    ) -> Option<Vec<InflexionRef>> {
        let table = self.tables.get(&paradigm)?;
        let fst = if slot { &table.slot } else { &table.anchored };
        let mut found: Vec<InflexionRef> = fst
            .prefixes_at(word, pos)
            .into_iter()
            .map(|&index| InflexionRef { paradigm, index })
            .collect();
        found.sort_unstable_by_key(|r| r.index);
        found.dedup();
        Some(found)
    }
}

/// Incorporable stems, keyed by their full surface.
#[derive(Debug)]
pub struct IncorporationIndex {
    fst: Fst<(SubLexRef, u32)>,
}

impl IncorporationIndex {
    pub fn build(grammar: &Grammar) -> Result<Self, FstError> {
        let mut builder = FstBuilder::new();
        for (id, lexeme) in grammar.lexemes() {
            for (i, sub) in lexeme.subs.iter().enumerate() {
                let Some(form) = sub.incorporation.as_ref().filter(|_| !sub.no_incorporation) else {
                    continue;
                };
                let key: Vec<char> = form.stem.chars().collect();
                if key.is_empty() {
                    continue;
                }
                let sub_ref = SubLexRef {
                    lexeme: id,
                    sub: i as u32,
                };
                builder.insert(&key, (sub_ref, key.len() as u32))?;
            }
        }
        Ok(Self { fst: builder.build() })
    }

    /// Incorporable stems starting at `pos`, with their lengths.
    pub fn at(&self, word: &[char], pos: usize) -> Vec<(SubLexRef, usize)> {
        self.fst
            .prefixes_at(word, pos)
            .into_iter()
            .map(|&(sub, len)| (sub, len as usize))
            .collect()
    }
}
