// Compiled grammar: paradigms, lexemes, clitics and post-processing rules

pub mod arena;
pub mod bad_analysis;
pub mod clitic;
pub mod compiler;
pub mod derivation;
pub mod descriptor;
pub mod field;
pub mod inflexion;
pub mod lex_rule;
pub mod lexeme;
pub mod paradigm;
pub mod stem_conversion;

use std::time::Duration;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uniparse_core::enums::{MAX_DERIVATIONS, RECURS_LIMIT};
use uniparse_fst::FstError;

pub use arena::{Arena, Handle};
pub use bad_analysis::BadAnalyses;
pub use clitic::Clitic;
pub use compiler::{CompiledGrammar, GrammarBuilder};
pub use field::{Field, RegexTest};
pub use inflexion::{FlexPart, Inflexion};
pub use lex_rule::{LexRule, RuleMode};
pub use lexeme::{Lexeme, SubLexRef, SubLexeme};
pub use paradigm::{DerivInfo, Paradigm};
pub use stem_conversion::StemConversion;

pub type ParadigmId = Handle<Paradigm>;
pub type LexemeId = Handle<Lexeme>;

/// Address of one inflexion inside its paradigm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InflexionRef {
    pub paradigm: ParadigmId,
    pub index: u32,
}

/// Grammar-definition and load errors.
///
/// Definition errors are collected as diagnostics and the offending entity
/// is skipped; only `Json` and `OutOfMemory` end a load call.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("malformed flex {flex:?}: {reason}")]
    MalformedFlex { flex: String, reason: &'static str },
    #[error("duplicate paradigm {0:?}")]
    DuplicateParadigm(String),
    #[error("unknown paradigm {name:?} referenced from {context}")]
    UnknownParadigm { name: String, context: String },
    #[error("unknown derivation {name:?} linked from paradigm {paradigm:?}")]
    UnknownDerivation { name: String, paradigm: String },
    #[error("unknown stem conversion {name:?} in lexeme {lemma:?}")]
    UnknownStemConversion { name: String, lemma: String },
    #[error("inflexion {flex:?} of {paradigm} continues with <.> but names no subsequent paradigm")]
    MissingSubsequent { flex: String, paradigm: String },
    #[error("lexeme {lemma:?} has no stem")]
    EmptyStem { lemma: String },
    #[error("lexeme {lemma:?} has no paradigm")]
    NoParadigm { lemma: String },
    #[error("stem number {num} of inflexion {flex:?} is out of range for lexeme {lemma:?} with {num_stems} stems")]
    StemNumberOutOfRange {
        lemma: String,
        flex: String,
        num: usize,
        num_stems: usize,
    },
    #[error("invalid regex {pattern:?} in {context}: {source}")]
    InvalidRegex {
        pattern: String,
        context: String,
        #[source]
        source: regex::Error,
    },
    #[error("lexical rule names neither a lemma nor a stem")]
    LexRuleWithoutTrigger,
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("out of memory while loading {what}")]
    OutOfMemory { what: &'static str },
    #[error(transparent)]
    Fst(#[from] FstError),
}

/// Compilation and search limits owned by the grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// How many times one inflexion or derivation may repeat in a branch.
    pub recurs_limit: usize,
    /// Derivation paradigms allowed in one analysis.
    pub max_derivations: usize,
    /// Stop widening paradigms once `min_flex_length` and the time budget
    /// are met.
    pub partial_compile: bool,
    pub min_flex_length: usize,
    pub max_compile_time: Duration,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            recurs_limit: RECURS_LIMIT,
            max_derivations: MAX_DERIVATIONS,
            partial_compile: true,
            min_flex_length: 1,
            max_compile_time: Duration::from_secs(60),
        }
    }
}

/// Frozen grammar. Immutable once compiled and shared between parsers.
#[derive(Debug)]
pub struct Grammar {
    pub config: GrammarConfig,
    pub(crate) paradigms: Arena<Paradigm>,
    pub(crate) paradigm_names: HashMap<String, ParadigmId>,
    pub(crate) lexemes: Arena<Lexeme>,
    pub(crate) clitics: Vec<Clitic>,
    pub(crate) stem_conversions: HashMap<String, StemConversion>,
    pub(crate) bad_analyses: BadAnalyses,
    pub(crate) lex_rules_by_stem: HashMap<String, Vec<LexRule>>,
    pub(crate) lex_rules_by_lemma: HashMap<String, Vec<LexRule>>,
    pub(crate) categories: HashMap<String, String>,
}

impl Grammar {
    pub(crate) fn empty(config: GrammarConfig) -> Self {
        Self {
            config,
            paradigms: Arena::new(),
            paradigm_names: HashMap::new(),
            lexemes: Arena::new(),
            clitics: Vec::new(),
            stem_conversions: HashMap::new(),
            bad_analyses: BadAnalyses::default(),
            lex_rules_by_stem: HashMap::new(),
            lex_rules_by_lemma: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    #[inline]
    pub fn paradigm(&self, id: ParadigmId) -> Option<&Paradigm> {
        self.paradigms.get(id)
    }

    pub fn paradigm_id(&self, name: &str) -> Option<ParadigmId> {
        self.paradigm_names.get(name).copied()
    }

    pub fn paradigm_by_name(&self, name: &str) -> Option<&Paradigm> {
        self.paradigm_id(name).and_then(|id| self.paradigm(id))
    }

    pub fn paradigms(&self) -> impl Iterator<Item = (ParadigmId, &Paradigm)> {
        self.paradigms.iter()
    }

    pub fn paradigm_count(&self) -> usize {
        self.paradigms.len()
    }

    #[inline]
    pub fn inflexion(&self, r: InflexionRef) -> Option<&Inflexion> {
        self.paradigm(r.paradigm)?.inflexions.get(r.index as usize)
    }

    #[inline]
    pub fn lexeme(&self, id: LexemeId) -> Option<&Lexeme> {
        self.lexemes.get(id)
    }

    pub fn lexemes(&self) -> impl Iterator<Item = (LexemeId, &Lexeme)> {
        self.lexemes.iter()
    }

    pub fn lexeme_count(&self) -> usize {
        self.lexemes.len()
    }

    #[inline]
    pub fn sublexeme(&self, r: SubLexRef) -> Option<&SubLexeme> {
        self.lexeme(r.lexeme)?.subs.get(r.sub as usize)
    }

    pub fn clitics(&self) -> &[Clitic] {
        &self.clitics
    }

    pub fn stem_conversion(&self, name: &str) -> Option<&StemConversion> {
        self.stem_conversions.get(name)
    }

    pub fn bad_analyses(&self) -> &BadAnalyses {
        &self.bad_analyses
    }

    pub fn lex_rules_for_lemma(&self, lemma: &str) -> &[LexRule] {
        self.lex_rules_by_lemma.get(lemma).map_or(&[], Vec::as_slice)
    }

    pub fn lex_rules_for_stem(&self, stem: &str) -> &[LexRule] {
        self.lex_rules_by_stem.get(stem).map_or(&[], Vec::as_slice)
    }

    pub fn has_lex_rules(&self) -> bool {
        !self.lex_rules_by_lemma.is_empty() || !self.lex_rules_by_stem.is_empty()
    }

    /// Tag to category name, used by output formatting only.
    pub fn categories(&self) -> &HashMap<String, String> {
        &self.categories
    }

    pub fn category(&self, tag: &str) -> Option<&str> {
        self.categories.get(tag).map(String::as_str)
    }
}
