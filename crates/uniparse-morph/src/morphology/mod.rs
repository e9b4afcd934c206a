// Morphological analysis of single hosts (clitics already stripped)

pub mod clitics;
pub mod construct;
pub mod engine;
pub mod index;
pub mod postprocess;
mod state;

pub use clitics::{Split, attach_clitics, get_hosts};
pub use construct::{Joined, build_wordform, generate_wordforms, join_stem_flex};
pub use engine::StepBudget;
pub use index::{AffixIndex, IncorporationIndex, StemIndex, StemMatch};

use std::rc::Rc;
use std::sync::Arc;

use hashbrown::HashMap;
use regex::Regex;
use uniparse_core::wordform::Wordform;

use crate::grammar::Grammar;
use crate::parser::{ParserConfig, ParserError};
use engine::{Engine, Limits};
use state::ParseState;

/// Trait for morphological analyzers.
///
/// Implementations analyze a bare host; clitic handling, caching and
/// post-processing happen in the parser.
pub trait Analyzer {
    /// Every analysis of `host` reachable with at most `replacements` edit
    /// operations, spending at most the given budget.
    fn analyze(&self, host: &str, replacements: usize, budget: &mut StepBudget) -> Vec<Wordform>;
}

/// Analyzer over a compiled grammar and its indices.
#[derive(Debug)]
pub struct MorphAnalyzer {
    grammar: Arc<Grammar>,
    stems: StemIndex,
    affixes: AffixIndex,
    incorporations: IncorporationIndex,
    /// Forms of stems without literal characters, by surface.
    pregenerated: HashMap<String, Vec<Wordform>>,
    limits: Limits,
    min_replacement_stem_len: usize,
    no_replacements: Option<Regex>,
}

impl MorphAnalyzer {
    pub fn new(grammar: Arc<Grammar>, config: &ParserConfig) -> Result<Self, ParserError> {
        let stems = StemIndex::build(&grammar, config.max_stem_start_len)?;
        let affixes = AffixIndex::build(&grammar)?;
        let incorporations = IncorporationIndex::build(&grammar)?;

        let mut pregenerated: HashMap<String, Vec<Wordform>> = HashMap::new();
        for &sub in stems.pregenerate() {
            for wordform in generate_wordforms(&grammar, sub) {
                pregenerated.entry(wordform.wf.clone()).or_default().push(wordform);
            }
        }
        log::debug!("pregenerated {} surface forms", pregenerated.len());

        let no_replacements = config
            .no_replacements
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ParserError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self {
            grammar,
            stems,
            affixes,
            incorporations,
            pregenerated,
            limits: Limits {
                max_empty_inflexions: config.max_empty_inflexions,
                min_replacement_word_len: config.min_replacement_word_len,
            },
            min_replacement_stem_len: config.min_replacement_stem_len,
            no_replacements,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Shared handle to the grammar.
    pub fn grammar_arc(&self) -> Arc<Grammar> {
        Arc::clone(&self.grammar)
    }

    /// Whether a replacement pass may run for `host` at all.
    fn replacements_allowed(&self, host: &str, word_len: usize) -> bool {
        word_len >= self.limits.min_replacement_word_len
            && !self.no_replacements.as_ref().is_some_and(|rx| rx.is_match(host))
    }

    /// Whether some analysis in `found` survives the bad-analysis filter.
    fn any_acceptable(&self, found: &[Wordform]) -> bool {
        let bad = self.grammar.bad_analyses();
        (0..found.len()).any(|i| !bad.is_bad(found, i))
    }

    /// One pass over every stem placement.
    fn run_pass(&self, word: &[char], replacements: usize, budget: &mut StepBudget) -> Vec<Wordform> {
        let engine = Engine {
            grammar: &self.grammar,
            affixes: &self.affixes,
            incorporations: &self.incorporations,
            limits: self.limits,
        };
        let exact: Rc<[char]> = word.into();
        let mut found = Vec::new();
        for m in self.stems.lookup(word, replacements) {
            if replacements > 0 && m.segment.len() < self.min_replacement_stem_len {
                continue;
            }
            let Some(sub) = self.grammar.sublexeme(m.entry.sub) else {
                continue;
            };
            let state_word = if m.edits.is_empty() {
                Rc::clone(&exact)
            } else {
                m.corrected_word(word).into()
            };
            let state = ParseState::new(
                state_word,
                m.entry.sub,
                sub.pattern.as_slice().into(),
                m.start,
                m.entry.offset as usize,
                m.segment.len(),
            );
            found.extend(engine.run(state, word, replacements, budget));
            if budget.is_exhausted() {
                break;
            }
        }
        found
    }
}

impl Analyzer for MorphAnalyzer {
    fn analyze(&self, host: &str, replacements: usize, budget: &mut StepBudget) -> Vec<Wordform> {
        let word: Vec<char> = host.chars().collect();
        let mut found = self.run_pass(&word, 0, budget);
        if let Some(forms) = self.pregenerated.get(host) {
            found.extend(forms.iter().cloned());
        }
        if replacements > 0
            && !self.any_acceptable(&found)
            && !budget.is_exhausted()
            && self.replacements_allowed(host, word.len())
        {
            found = self.run_pass(&word, replacements, budget);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::descriptor::{
        DerivLinkDescriptor, DerivationDescriptor, InflexionDescriptor, LexemeDescriptor,
        ParadigmDescriptor,
    };
    use crate::grammar::{GrammarBuilder, GrammarConfig};

    fn lexeme(lemma: &str, stem: &str, paradigm: &str, gloss: &str) -> LexemeDescriptor {
        LexemeDescriptor {
            lemma: lemma.into(),
            stem: stem.into(),
            paradigms: vec![paradigm.into()],
            gramm: "N".into(),
            gloss: gloss.into(),
            ..LexemeDescriptor::default()
        }
    }

    fn analyzer() -> MorphAnalyzer {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let mut continued = InflexionDescriptor::new(".er<.>", "cmp", "CMP");
        continued.paradigms = vec!["N".into()];
        builder
            .add_paradigms([
                ParadigmDescriptor {
                    name: "N".into(),
                    inflexions: vec![
                        InflexionDescriptor::new(".", "sg", ""),
                        InflexionDescriptor::new(".s", "pl", "PL"),
                    ],
                    derivations: Vec::new(),
                },
                ParadigmDescriptor {
                    name: "P".into(),
                    inflexions: vec![InflexionDescriptor::new("ex.", "pfx", "EX")],
                    derivations: Vec::new(),
                },
                ParadigmDescriptor {
                    name: "A".into(),
                    inflexions: vec![InflexionDescriptor::new(".", "pos", ""), continued],
                    derivations: Vec::new(),
                },
                ParadigmDescriptor {
                    name: "V".into(),
                    inflexions: vec![InflexionDescriptor::new(".", "inf", "")],
                    derivations: vec![DerivLinkDescriptor {
                        derivation: "agent".into(),
                        recurs_class: 0,
                        paradigms: Vec::new(),
                    }],
                },
            ])
            .unwrap();
        builder
            .add_derivations([DerivationDescriptor {
                name: "agent".into(),
                inflexions: vec![InflexionDescriptor::new(".ing", "agent", "AG")],
                paradigms: vec!["N".into()],
            }])
            .unwrap();
        builder
            .add_lexemes([
                lexeme("test", "test.", "N", "test"),
                lexeme("test", ".test.", "P", "test"),
                lexeme("tall", "tall.", "A", "tall"),
                lexeme("walk", "walk.", "V", "walk"),
                lexeme("kitten", "kitten.", "N", "cat"),
                lexeme("mitten", "mitten.", "N", "glove"),
            ])
            .unwrap();
        builder
            .load_bad_analyses_json(r#"[{"lex": "mitten"}]"#)
            .unwrap();
        let compiled = builder.compile().unwrap();
        MorphAnalyzer::new(Arc::new(compiled.grammar), &ParserConfig::default()).unwrap()
    }

    fn analyze(a: &MorphAnalyzer, word: &str, k: usize) -> Vec<Wordform> {
        let mut budget = StepBudget::new(10_000);
        a.analyze(word, k, &mut budget)
    }

    #[test]
    fn suffix_analysis() {
        let a = analyzer();
        let found = analyze(&a, "tests", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].wf, "tests");
        assert_eq!(found[0].wf_glossed, "test-s");
        assert_eq!(found[0].gloss, "test-PL");
        assert_eq!(found[0].gramm, "N,pl");
    }

    #[test]
    fn prefix_before_stem() {
        let a = analyzer();
        let found = analyze(&a, "extest", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].wf_glossed, "ex-test");
        assert_eq!(found[0].gramm, "N,pfx");
    }

    #[test]
    fn continuation_into_subsequent_paradigm() {
        let a = analyzer();
        let found = analyze(&a, "tallers", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].gramm, "N,cmp,pl");
        assert_eq!(found[0].wf_glossed, "tall-er-s");
        assert_eq!(found[0].gloss, "tall-CMP-PL");
    }

    #[test]
    fn derivation_fork() {
        let a = analyzer();
        let found = analyze(&a, "walkings", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].lemma, "walk");
        assert_eq!(found[0].gramm, "N,agent,pl");
        assert!(analyze(&a, "walkingings", 0).is_empty());
    }

    #[test]
    fn every_analysis_spells_the_word() {
        let a = analyzer();
        for word in ["test", "tests", "extest", "tall", "taller", "tallers", "walk", "walking"] {
            let found = analyze(&a, word, 0);
            assert!(!found.is_empty(), "{word}");
            assert!(found.iter().all(|w| w.wf == word), "{word}");
        }
        assert!(analyze(&a, "testx", 0).is_empty());
    }

    #[test]
    fn replacements_stay_within_distance() {
        let a = analyzer();
        assert!(analyze(&a, "kittwns", 0).is_empty());
        let host: Vec<char> = "kittwns".chars().collect();
        let found = analyze(&a, "kittwns", 1);
        assert!(!found.is_empty());
        for w in &found {
            assert_eq!(w.lemma, "kitten");
            let wf: Vec<char> = w.wf.chars().collect();
            assert!(uniparse_fst::damerau_levenshtein(&wf, &host) <= 1, "{w:?}");
        }
        assert!(found.iter().any(|w| w.wf == "kittens" && w.gramm == "N,pl"));
    }

    #[test]
    fn short_stems_and_words_get_no_replacements() {
        let a = analyzer();
        // `test` is below the stem length limit.
        assert!(analyze(&a, "teswts", 1).is_empty());
        // `kittwn` is long enough but `kitwn` is not.
        assert!(!analyze(&a, "kittwn", 1).is_empty());
        assert!(analyze(&a, "kitwn", 1).is_empty());
    }

    #[test]
    fn rejected_exact_analyses_open_the_replacement_pass() {
        let a = analyzer();
        let exact = analyze(&a, "mittens", 0);
        assert!(exact.iter().all(|w| w.lemma == "mitten"));
        assert!(a.grammar().bad_analyses().filter(exact).is_empty());

        let found = analyze(&a, "mittens", 1);
        let kept = a.grammar().bad_analyses().filter(found);
        assert!(!kept.is_empty());
        assert!(kept.iter().all(|w| w.lemma == "kitten" && w.wf == "kittens"), "{kept:?}");
    }

    #[test]
    fn budget_stops_the_search() {
        let a = analyzer();
        let mut budget = StepBudget::new(3);
        assert!(a.analyze("tests", 0, &mut budget).is_empty());
        assert!(budget.is_exhausted());
    }
}
