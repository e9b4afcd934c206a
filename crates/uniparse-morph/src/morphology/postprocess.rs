// Post-processing of a host's analyses: bad-analysis filter, lexical
// rules, sub-word expansion, de-duplication

use hashbrown::HashSet;
use uniparse_core::wordform::Wordform;

use crate::grammar::{Grammar, LexRule, RuleMode};

/// Rules that fire on `wordform`: lemma rules, then stem rules whose lemma
/// (if any) agrees.
fn rules_for<'g>(grammar: &'g Grammar, wordform: &Wordform) -> impl Iterator<Item = &'g LexRule> {
    let lemma = wordform.lemma.clone();
    grammar
        .lex_rules_for_lemma(&wordform.lemma)
        .iter()
        .chain(
            grammar
                .lex_rules_for_stem(&wordform.stem)
                .iter()
                .filter(move |r| r.lemma.as_ref().is_none_or(|l| *l == lemma)),
        )
}

/// Apply lexical rules to every analysis.
///
/// `Augment` rules add their output next to the original; a `Replace` rule
/// that fires drops the original.
pub fn apply_lex_rules(grammar: &Grammar, analyses: Vec<Wordform>) -> Vec<Wordform> {
    if !grammar.has_lex_rules() {
        return analyses;
    }
    let mut out = Vec::with_capacity(analyses.len());
    for ana in analyses {
        let mut produced = Vec::new();
        let mut replaced = false;
        for rule in rules_for(grammar, &ana) {
            if let Some(new) = rule.apply(&ana) {
                replaced |= rule.mode == RuleMode::Replace;
                produced.push(new);
            }
        }
        if !replaced {
            out.push(ana);
        }
        out.extend(produced);
    }
    out
}

/// Drop later copies, keeping first occurrences in order.
pub fn dedup(analyses: Vec<Wordform>) -> Vec<Wordform> {
    let mut seen = HashSet::with_capacity(analyses.len());
    analyses
        .into_iter()
        .filter(|ana| seen.insert(ana.clone()))
        .collect()
}

/// Full post-processing chain of one host.
pub fn postprocess(grammar: &Grammar, analyses: Vec<Wordform>) -> Vec<Wordform> {
    let analyses = grammar.bad_analyses().filter(analyses);
    let mut analyses = apply_lex_rules(grammar, analyses);
    for ana in &mut analyses {
        ana.expand_lex_markers();
    }
    dedup(analyses)
}
