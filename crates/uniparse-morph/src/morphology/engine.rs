// Backtracking matcher: walks a stem pattern and a stack of inflexion
// levels against one word.
//
// Every node of the search is a `ParseState`. A step either advances the
// state in place, forks it (inflexion lookup, incorporation), or kills it.
// States are kept on an explicit work stack; a state is collected once
// `can_continue` turns false.

use uniparse_core::character::{BOUNDARY, MORPH_BREAK};
use uniparse_core::enums::{GlossType, Position, WILDCARD};
use uniparse_core::wordform::Wordform;
use uniparse_fst::damerau_levenshtein;

use super::construct::{build_wordform, merge_levels};
use super::index::{AffixIndex, IncorporationIndex};
use super::state::{Incorporated, InflLevel, ParseState};
use crate::grammar::{Grammar, Inflexion, InflexionRef, ParadigmId};

/// Remaining loop iterations for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget {
    remaining: usize,
    exhausted: bool,
}

impl StepBudget {
    pub fn new(steps: usize) -> Self {
        Self {
            remaining: steps,
            exhausted: false,
        }
    }

    /// Spend one step. `false` once the budget is gone.
    #[inline]
    pub fn spend(&mut self) -> bool {
        if self.remaining == 0 {
            self.exhausted = true;
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

enum Step {
    Next(ParseState),
    Branch(Vec<ParseState>),
    Dead,
}

#[inline]
fn chars_match(a: char, b: char) -> bool {
    a == b || a == WILDCARD || b == WILDCARD
}

/// Limits the matcher needs besides the grammar's own.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub max_empty_inflexions: usize,
    pub min_replacement_word_len: usize,
}

pub(crate) struct Engine<'a> {
    pub grammar: &'a Grammar,
    pub affixes: &'a AffixIndex,
    pub incorporations: &'a IncorporationIndex,
    pub limits: Limits,
}

impl Engine<'_> {
    /// Explore `initial` and return every wordform it leads to.
    ///
    /// `host` is the word before any edit operation; `replacements` bounds
    /// the distance between it and a reconstructed surface.
    pub fn run(
        &self,
        initial: ParseState,
        host: &[char],
        replacements: usize,
        budget: &mut StepBudget,
    ) -> Vec<Wordform> {
        let mut found = Vec::new();
        let mut stack = vec![initial];
        while let Some(state) = stack.pop() {
            if !budget.spend() {
                break;
            }
            if !self.can_continue(&state) {
                found.extend(self.collect(&state, host, replacements));
                continue;
            }
            match self.step(state) {
                Step::Next(next) => stack.push(next),
                Step::Branch(branches) => stack.extend(branches.into_iter().rev()),
                Step::Dead => {}
            }
        }
        found
    }

    fn inflexion_of(&self, level: &InflLevel) -> Option<&Inflexion> {
        self.grammar.inflexion(level.infl)
    }

    fn can_continue(&self, st: &ParseState) -> bool {
        if !st.word_done() {
            return true;
        }
        let Some(last) = st.levels.last() else {
            return match st.stem_char() {
                None => true,
                Some(ch) => ch == BOUNDARY || ch == MORPH_BREAK,
            };
        };
        let Some(part) = self
            .inflexion_of(last)
            .and_then(|infl| infl.parts.get(last.cur_part))
        else {
            return false;
        };
        match part.gloss_type {
            GlossType::Stem | GlossType::StemForced | GlossType::StartWithSelf => {
                st.cur_stem_pos < st.pattern.len() || st.pattern_ends_with_boundary()
            }
            GlossType::NextFlex | GlossType::Incorporation => true,
            _ => last.cur_pos >= part.surface.len(),
        }
    }

    fn step(&self, st: ParseState) -> Step {
        match st.cur_level {
            None => self.step_stem(st),
            Some(level) => self.step_inflexion(st, level),
        }
    }

    // ========================================================================
    // Stem level
    // ========================================================================

    fn step_stem(&self, mut st: ParseState) -> Step {
        let Some(ch) = st.stem_char() else {
            return Step::Dead;
        };
        let Some(sub) = self.grammar.sublexeme(st.sub) else {
            return Step::Dead;
        };

        if ch == BOUNDARY {
            let first = st.cur_stem_pos == 0;
            st.cur_stem_pos += 1;
            if !st.levels.is_empty() {
                st.cur_level = Some(0);
                return Step::Next(st);
            }
            let branches: Vec<ParseState> = self
                .find_inflexions(&st, sub.paradigm, first, None)
                .into_iter()
                .map(|r| self.open_level(&st, r, sub.paradigm))
                .collect();
            return if branches.is_empty() {
                Step::Dead
            } else {
                Step::Branch(branches)
            };
        }

        if st.cur_stem_pos == 0 && st.levels.is_empty() && !st.self_checked {
            st.self_checked = true;
            let mut branches: Vec<ParseState> = self
                .find_inflexions(&st, sub.paradigm, true, None)
                .into_iter()
                .filter(|&r| self.grammar.inflexion(r).is_some_and(|i| i.start_with_self))
                .map(|r| self.open_level(&st, r, sub.paradigm))
                .collect();
            if !branches.is_empty() {
                log::trace!("{} starts-with-self inflexions", branches.len());
                branches.push(st);
                return Step::Branch(branches);
            }
        }

        if ch == MORPH_BREAK {
            st.cur_stem_pos += 1;
            return Step::Next(st);
        }

        if st.in_corrected_span() {
            if st.cur_pos != st.wf_corr_start + st.cur_stem_pos - st.stem_corr_start {
                return Step::Dead;
            }
        } else {
            match st.word.get(st.cur_pos) {
                Some(&w) if chars_match(w, ch) => {}
                _ => return Step::Dead,
            }
        }
        st.cur_pos += 1;
        st.cur_stem_pos += 1;
        Step::Next(st)
    }

    /// Branch of `st` with `infl` pushed as the new innermost level.
    fn open_level(&self, st: &ParseState, infl: InflexionRef, para_link: ParadigmId) -> ParseState {
        let derivation = self
            .grammar
            .paradigm(infl.paradigm)
            .filter(|p| p.is_derivational())
            .map(|_| infl.paradigm);
        st.with_level(InflLevel::new(infl, para_link), derivation)
    }

    // ========================================================================
    // Inflexion levels
    // ========================================================================

    fn step_inflexion(&self, mut st: ParseState, level: usize) -> Step {
        let Some(infl) = st.levels.get(level).and_then(|l| self.inflexion_of(l)) else {
            return Step::Dead;
        };
        let cur_part = st.levels[level].cur_part;
        let Some(part) = infl.parts.get(cur_part) else {
            st.cur_level = level.checked_sub(1);
            return Step::Next(st);
        };

        match part.gloss_type {
            GlossType::Stem | GlossType::StemForced => {
                let up = Self::switch_to_upper_level(&st, level, infl);
                st.levels[level].next_part();
                if up {
                    st.cur_level = level.checked_sub(1);
                }
                Step::Next(st)
            }
            GlossType::StartWithSelf => {
                st.levels[level].next_part();
                Step::Next(st)
            }
            GlossType::NextFlex => {
                st.levels[level].next_part();
                if level + 1 < st.levels.len() {
                    st.cur_level = Some(level + 1);
                    return Step::Next(st);
                }
                let mut branches = Vec::new();
                for &paradigm in &infl.subsequent {
                    for r in self.find_inflexions(&st, paradigm, false, None) {
                        branches.push(self.open_level(&st, r, paradigm));
                    }
                }
                if branches.is_empty() {
                    Step::Dead
                } else {
                    Step::Branch(branches)
                }
            }
            GlossType::Incorporation => {
                let branches: Vec<ParseState> = self
                    .incorporations
                    .at(&st.word, st.cur_pos)
                    .into_iter()
                    .map(|(sub, len)| {
                        let mut next = st.clone();
                        next.cur_pos += len;
                        let lvl = &mut next.levels[level];
                        lvl.incorporations.push(Incorporated {
                            part: cur_part,
                            sub,
                        });
                        lvl.next_part();
                        next
                    })
                    .collect();
                if branches.is_empty() {
                    Step::Dead
                } else {
                    Step::Branch(branches)
                }
            }
            _ => {
                let lvl_pos = st.levels[level].cur_pos;
                let Some(&expected) = part.surface.get(lvl_pos) else {
                    st.levels[level].next_part();
                    return Step::Next(st);
                };
                match st.word.get(st.cur_pos) {
                    Some(&w) if chars_match(w, expected) => {
                        st.cur_pos += 1;
                        st.levels[level].cur_pos += 1;
                        Step::Next(st)
                    }
                    _ => Step::Dead,
                }
            }
        }
    }

    /// Whether a boundary part at the current level hands control back to
    /// the stem (or to the enclosing level).
    ///
    /// The leading boundary of a nested level never does: the enclosing
    /// level already stands behind the stem.
    fn switch_to_upper_level(st: &ParseState, level: usize, infl: &Inflexion) -> bool {
        let part = st.levels[level].cur_part;
        let near_leading_boundary = st.cur_stem_pos < 2 && st.pattern_starts_with_boundary();
        if infl.start_with_self {
            return part > 1 || near_leading_boundary;
        }
        part != 0 || (level == 0 && near_leading_boundary)
    }

    /// Inflexions of `paradigm` that may start at the current position.
    ///
    /// Pruning order: empty depth, derivation count, derivation
    /// restriction and repetition, inflexion repetition. Transparent
    /// inflexions are looked through.
    fn find_inflexions(
        &self,
        st: &ParseState,
        paradigm: ParadigmId,
        slot: bool,
        depth: Option<usize>,
    ) -> Vec<InflexionRef> {
        let grammar = self.grammar;
        let depth = depth.unwrap_or_else(|| self.empty_depth(st));
        if depth > self.limits.max_empty_inflexions {
            return Vec::new();
        }
        let Some(para) = grammar.paradigm(paradigm) else {
            log::error!("unknown paradigm {paradigm:?}");
            return Vec::new();
        };
        if para.is_derivational() {
            if st.derivs_used.len() >= grammar.config.max_derivations {
                return Vec::new();
            }
            if let Some(info) = &para.derivation {
                let used = st.derivs_used.iter().filter_map(|&p| grammar.paradigm(p));
                let mut repeats = 0;
                for earlier in used {
                    if earlier.restricts(&info.derivation) {
                        return Vec::new();
                    }
                    if earlier
                        .derivation
                        .as_ref()
                        .is_some_and(|d| d.derivation == info.derivation)
                    {
                        repeats += 1;
                    }
                }
                if repeats >= grammar.config.recurs_limit {
                    return Vec::new();
                }
            }
        }

        let Some(candidates) = self.affixes.candidates(paradigm, &st.word, st.cur_pos, slot) else {
            log::error!("paradigm {:?} is missing from the affix index", para.name);
            return Vec::new();
        };
        let mut found = Vec::new();
        for r in candidates {
            let Some(infl) = grammar.inflexion(r) else {
                continue;
            };
            if st.infl_count(r) >= grammar.config.recurs_limit {
                continue;
            }
            if infl.is_transparent() {
                for &next in &infl.subsequent {
                    found.extend(self.find_inflexions(st, next, slot, Some(depth + 1)));
                }
            } else {
                found.push(r);
            }
        }
        found
    }

    /// Levels whose inflexion adds no surface and only continues.
    fn empty_depth(&self, st: &ParseState) -> usize {
        st.levels
            .iter()
            .filter_map(|l| self.inflexion_of(l))
            .filter(|infl| infl.literal_len() == 0 && infl.has_next_flex())
            .count()
    }

    // ========================================================================
    // Acceptance
    // ========================================================================

    /// Wordform of a finished state, if it really spells the word.
    fn collect(&self, st: &ParseState, host: &[char], replacements: usize) -> Option<Wordform> {
        if !st.word_done() || st.levels.is_empty() {
            return None;
        }
        let stem_rest = st.pattern.get(st.cur_stem_pos..).unwrap_or_default();
        if stem_rest.iter().any(|&c| c != BOUNDARY && c != MORPH_BREAK) {
            return None;
        }
        let last = self.inflexion_of(st.levels.last()?)?;
        if last.has_next_flex() && last.position != Position::NonFinal {
            return None;
        }
        for level in &st.levels {
            if !self.level_finished(level) {
                return None;
            }
        }

        let merged = merge_levels(self.grammar, &st.levels)?;
        let wordform = build_wordform(self.grammar, st.sub, &merged)?;
        let surface: Vec<char> = wordform.wf.chars().collect();
        if surface != host {
            let min = self.limits.min_replacement_word_len;
            if replacements == 0
                || surface.len() < min
                || host.len() < min
                || damerau_levenshtein(&surface, host) > replacements
            {
                return None;
            }
        }
        for level in &st.levels {
            log::trace!("accepted level {:?} via {:?}", level.infl, level.para_link);
        }
        Some(wordform)
    }

    /// Only markers and zero-surface parts may remain.
    fn level_finished(&self, level: &InflLevel) -> bool {
        let Some(infl) = self.inflexion_of(level) else {
            return false;
        };
        let Some(current) = infl.parts.get(level.cur_part) else {
            return true;
        };
        let current_done = match current.gloss_type {
            GlossType::Incorporation => false,
            GlossType::Stem | GlossType::StemForced | GlossType::StartWithSelf | GlossType::NextFlex => true,
            _ => level.cur_pos >= current.surface.len(),
        };
        current_done
            && infl.parts[level.cur_part + 1..].iter().all(|p| {
                matches!(
                    p.gloss_type,
                    GlossType::Stem | GlossType::StemForced | GlossType::StartWithSelf | GlossType::NextFlex
                ) || (p.gloss_type != GlossType::Incorporation && p.surface.is_empty())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_runs_out_once() {
        let mut budget = StepBudget::new(2);
        assert!(budget.spend());
        assert!(budget.spend());
        assert!(!budget.is_exhausted());
        assert!(!budget.spend());
        assert!(budget.is_exhausted());
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn wildcard_matches_either_side() {
        assert!(chars_match('a', 'a'));
        assert!(chars_match(WILDCARD, 'a'));
        assert!(chars_match('a', WILDCARD));
        assert!(!chars_match('a', 'b'));
    }
}
