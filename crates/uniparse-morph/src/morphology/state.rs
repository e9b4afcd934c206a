// Search nodes of the matching engine

use std::rc::Rc;

use uniparse_core::character::BOUNDARY;

use crate::grammar::{InflexionRef, ParadigmId, SubLexRef};

/// A sub-lexeme consumed by an `<+>` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Incorporated {
    /// Index of the `<+>` part in the level's inflexion.
    pub part: usize,
    pub sub: SubLexRef,
}

/// One inflexion on the level stack.
#[derive(Debug, Clone)]
pub(crate) struct InflLevel {
    pub infl: InflexionRef,
    /// Paradigm the inflexion was requested from; differs from
    /// `infl.paradigm` when it was reached through a link inflexion.
    pub para_link: ParadigmId,
    pub cur_part: usize,
    /// Characters of the current part already consumed.
    pub cur_pos: usize,
    pub incorporations: Vec<Incorporated>,
}

impl InflLevel {
    pub fn new(infl: InflexionRef, para_link: ParadigmId) -> Self {
        Self {
            infl,
            para_link,
            cur_part: 0,
            cur_pos: 0,
            incorporations: Vec::new(),
        }
    }

    #[inline]
    pub fn next_part(&mut self) {
        self.cur_part += 1;
        self.cur_pos = 0;
    }
}

/// One node of the backtracking search.
///
/// `cur_level == None` means the stem is being walked; otherwise it indexes
/// `levels`.
#[derive(Debug, Clone)]
pub(crate) struct ParseState {
    /// The word, possibly rewritten by edit operations.
    pub word: Rc<[char]>,
    pub sub: SubLexRef,
    pub pattern: Rc<[char]>,
    pub wf_corr_start: usize,
    pub stem_corr_start: usize,
    pub corr_length: usize,
    pub cur_level: Option<usize>,
    pub cur_stem_pos: usize,
    pub cur_pos: usize,
    pub levels: Vec<InflLevel>,
    /// Derivational paradigms entered so far, in order.
    pub derivs_used: Vec<ParadigmId>,
    /// Starts-with-self inflexions were already tried at stem position 0.
    pub self_checked: bool,
}

impl ParseState {
    pub fn new(
        word: Rc<[char]>,
        sub: SubLexRef,
        pattern: Rc<[char]>,
        wf_corr_start: usize,
        stem_corr_start: usize,
        corr_length: usize,
    ) -> Self {
        Self {
            word,
            sub,
            pattern,
            wf_corr_start,
            stem_corr_start,
            corr_length,
            cur_level: None,
            cur_stem_pos: 0,
            cur_pos: 0,
            levels: Vec::new(),
            derivs_used: Vec::new(),
            self_checked: false,
        }
    }

    #[inline]
    pub fn word_done(&self) -> bool {
        self.cur_pos >= self.word.len()
    }

    #[inline]
    pub fn stem_char(&self) -> Option<char> {
        self.pattern.get(self.cur_stem_pos).copied()
    }

    pub fn pattern_starts_with_boundary(&self) -> bool {
        self.pattern.first() == Some(&BOUNDARY)
    }

    pub fn pattern_ends_with_boundary(&self) -> bool {
        self.pattern.last() == Some(&BOUNDARY)
    }

    /// Whether stem position `cur_stem_pos` lies inside the stretch located
    /// by the stem index.
    pub fn in_corrected_span(&self) -> bool {
        self.stem_corr_start <= self.cur_stem_pos
            && self.cur_stem_pos < self.stem_corr_start + self.corr_length
    }

    /// How many levels already hold `infl`.
    pub fn infl_count(&self, infl: InflexionRef) -> usize {
        self.levels.iter().filter(|l| l.infl == infl).count()
    }

    /// Clone with a new inflexion level pushed and made current.
    pub fn with_level(&self, level: InflLevel, derivation: Option<ParadigmId>) -> Self {
        let mut next = self.clone();
        next.cur_level = Some(next.levels.len());
        next.levels.push(level);
        next.derivs_used.extend(derivation);
        next
    }
}
