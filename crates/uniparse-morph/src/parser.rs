// Parser: top-level handle for token analysis.
//
// Owns the compiled grammar (shared through an `Arc`) and the analyzer built
// over it. A `Parser` is immutable after construction and can be shared
// between threads; per-worker state (the parse cache) lives in a `Session`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uniparse_core::character::clean_token;
use uniparse_core::enums::{
    MAX_EMPTY_INFLEXIONS, MAX_STEM_START_LEN, MAX_TOKEN_LENGTH, MIN_REPLACEMENT_STEM_LEN,
    MIN_REPLACEMENT_WORD_LEN,
};
use uniparse_core::token::{TokenTree, Tree};
use uniparse_core::wordform::Wordform;
use uniparse_fst::FstError;

use crate::cache::{DEFAULT_CACHE_CAPACITY, ParseCache};
use crate::grammar::{Grammar, GrammarBuilder, GrammarConfig, GrammarError};
use crate::morphology::postprocess::postprocess;
use crate::morphology::{Analyzer, MorphAnalyzer, StepBudget, attach_clitics, get_hosts};

/// Default number of engine iterations allowed for one token.
pub const DEFAULT_MAX_STEPS: usize = 200_000;

/// Error type for parser construction failures.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// An index transducer could not be built.
    #[error("failed to build index: {0}")]
    Index(#[from] FstError),

    /// The grammar could not be loaded.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("invalid no-replacement pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Runtime limits and switches of a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Longer tokens are not analyzed at all.
    pub max_token_length: usize,
    /// Length of the literal stem prefix indexed in the stem transducer.
    pub max_stem_start_len: usize,
    /// Empty inflexion levels allowed in a row.
    pub max_empty_inflexions: usize,
    pub min_replacement_stem_len: usize,
    pub min_replacement_word_len: usize,
    pub max_steps_per_token: usize,
    /// Memoize finished parses in each session.
    pub remember_parses: bool,
    pub cache_capacity: usize,
    /// Hosts matching this pattern never get a replacement pass.
    pub no_replacements: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_token_length: MAX_TOKEN_LENGTH,
            max_stem_start_len: MAX_STEM_START_LEN,
            max_empty_inflexions: MAX_EMPTY_INFLEXIONS,
            min_replacement_stem_len: MIN_REPLACEMENT_STEM_LEN,
            min_replacement_word_len: MIN_REPLACEMENT_WORD_LEN,
            max_steps_per_token: DEFAULT_MAX_STEPS,
            remember_parses: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            no_replacements: None,
        }
    }
}

/// Morphological parser over one compiled grammar.
///
/// # Example
///
/// ```no_run
/// use uniparse_morph::{GrammarConfig, Parser, ParserConfig};
///
/// let json = std::fs::read_to_string("grammar.json").unwrap();
/// let (parser, diagnostics) =
///     Parser::from_json(&json, GrammarConfig::default(), ParserConfig::default()).unwrap();
/// assert!(diagnostics.is_empty());
/// for ana in parser.parse("tests", 0) {
///     println!("{} {}", ana.lemma, ana.gramm);
/// }
/// ```
#[derive(Debug)]
pub struct Parser {
    analyzer: MorphAnalyzer,
    config: ParserConfig,
}

impl Parser {
    pub fn new(grammar: Grammar, config: ParserConfig) -> Result<Self, ParserError> {
        Self::with_shared(Arc::new(grammar), config)
    }

    /// Build a parser over a grammar that other parsers may share.
    pub fn with_shared(grammar: Arc<Grammar>, config: ParserConfig) -> Result<Self, ParserError> {
        let analyzer = MorphAnalyzer::new(grammar, &config)?;
        Ok(Self { analyzer, config })
    }

    /// Compile a JSON grammar description and build a parser over it.
    ///
    /// Definition errors do not fail the call; they come back as diagnostics
    /// (already logged by the compiler).
    pub fn from_json(
        text: &str,
        grammar_config: GrammarConfig,
        config: ParserConfig,
    ) -> Result<(Self, Vec<GrammarError>), ParserError> {
        let compiled = GrammarBuilder::from_json(text, grammar_config)?.compile()?;
        let parser = Self::new(compiled.grammar, config)?;
        Ok((parser, compiled.diagnostics))
    }

    pub fn grammar(&self) -> &Grammar {
        self.analyzer.grammar()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// All analyses of `token` with at most `replacements` edit operations.
    ///
    /// Never empty except for tokens over `max_token_length`: a token without
    /// analyses yields one placeholder carrying its surface.
    pub fn parse(&self, raw: &str, replacements: usize) -> Vec<Wordform> {
        let token = clean_token(raw);
        if token.is_empty() {
            return vec![Wordform::placeholder(raw)];
        }
        if token.chars().count() > self.config.max_token_length {
            log::debug!("token of {} chars not analyzed", token.chars().count());
            return Vec::new();
        }

        let grammar = self.analyzer.grammar();
        let mut budget = StepBudget::new(self.config.max_steps_per_token);
        let mut analyses = Vec::new();
        for split in get_hosts(grammar.clitics(), token) {
            let found = self.analyzer.analyze(&split.host, replacements, &mut budget);
            if found.is_empty() {
                continue;
            }
            let found = postprocess(grammar, found);
            analyses.extend(attach_clitics(token, &split.clitics, found));
            if budget.is_exhausted() {
                break;
            }
        }
        if budget.is_exhausted() {
            log::warn!(
                "step budget of {} exhausted on {token:?}, analyses may be incomplete",
                self.config.max_steps_per_token
            );
        }

        if analyses.is_empty() {
            analyses.push(Wordform::placeholder(token));
        }
        analyses
    }

    /// A session with its own parse cache.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }
}

/// Per-worker view of a parser.
#[derive(Debug)]
pub struct Session<'p> {
    parser: &'p Parser,
    cache: Option<ParseCache>,
}

impl<'p> Session<'p> {
    pub fn new(parser: &'p Parser) -> Self {
        let cache = parser
            .config
            .remember_parses
            .then(|| ParseCache::new(parser.config.cache_capacity));
        Self { parser, cache }
    }

    pub fn parser(&self) -> &'p Parser {
        self.parser
    }

    pub fn parse(&mut self, token: &str, replacements: usize) -> Vec<Wordform> {
        let Some(cache) = self.cache.as_mut() else {
            return self.parser.parse(token, replacements);
        };
        if let Some(hit) = cache.get(token, replacements) {
            return hit.to_vec();
        }
        let analyses = self.parser.parse(token, replacements);
        cache.store(token, replacements, &analyses);
        analyses
    }

    /// Parse every token of a nested structure, keeping the nesting.
    pub fn parse_tree(&mut self, tokens: &Tree<String>, replacements: usize) -> TokenTree {
        tokens.map(&mut |token| self.parse(token, replacements))
    }

    pub fn cache(&self) -> Option<&ParseCache> {
        self.cache.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::descriptor::{InflexionDescriptor, LexemeDescriptor, ParadigmDescriptor};

    fn parser(config: ParserConfig) -> Parser {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        builder
            .add_paradigms([ParadigmDescriptor {
                name: "N".into(),
                inflexions: vec![
                    InflexionDescriptor::new(".", "sg", ""),
                    InflexionDescriptor::new(".s", "pl", "PL"),
                ],
                derivations: Vec::new(),
            }])
            .unwrap();
        builder
            .add_lexemes([LexemeDescriptor {
                lemma: "test".into(),
                stem: "test.".into(),
                paradigms: vec!["N".into()],
                gramm: "N".into(),
                gloss: "test".into(),
                ..LexemeDescriptor::default()
            }])
            .unwrap();
        Parser::new(builder.compile().unwrap().grammar, config).unwrap()
    }

    #[test]
    fn parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }

    #[test]
    fn punctuation_is_trimmed() {
        let p = parser(ParserConfig::default());
        let found = p.parse("(tests,", 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].wf, "tests");
        assert_eq!(found[0].gramm, "N,pl");
    }

    #[test]
    fn unknown_token_gives_placeholder() {
        let p = parser(ParserConfig::default());
        let found = p.parse("blorg", 0);
        assert_eq!(found, vec![Wordform::placeholder("blorg")]);
        assert!(!found[0].is_analyzed());
    }

    #[test]
    fn empty_and_oversized_tokens() {
        let p = parser(ParserConfig {
            max_token_length: 8,
            ..ParserConfig::default()
        });
        assert_eq!(p.parse("", 0), vec![Wordform::placeholder("")]);
        assert!(p.parse("testtesttest", 0).is_empty());
    }

    #[test]
    fn punctuation_token_keeps_its_surface() {
        let p = parser(ParserConfig::default());
        let found = p.parse("?!", 0);
        assert_eq!(found, vec![Wordform::placeholder("?!")]);
        assert_eq!(found[0].wf, "?!");
    }

    #[test]
    fn session_cache_returns_same_analyses() {
        let p = parser(ParserConfig {
            remember_parses: true,
            ..ParserConfig::default()
        });
        let mut session = p.session();
        let first = session.parse("tests", 0);
        assert_eq!(session.cache().map(ParseCache::len), Some(1));
        assert_eq!(session.parse("tests", 0), first);
        assert!(p.session().cache().is_some_and(ParseCache::is_empty));
    }

    #[test]
    fn parse_tree_keeps_nesting() {
        let p = parser(ParserConfig::default());
        let tokens = Tree::Group(vec![
            Tree::Group(vec![Tree::Leaf("test".to_string()), Tree::Leaf("tests".to_string())]),
            Tree::Leaf("x".to_string()),
        ]);
        let parsed = p.session().parse_tree(&tokens, 0);
        let leaves = parsed.leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[1][0].gramm, "N,pl");
        assert!(!leaves[2][0].is_analyzed());
    }

    #[test]
    fn invalid_no_replacement_pattern() {
        let grammar = GrammarBuilder::new(GrammarConfig::default()).compile().unwrap().grammar;
        let err = Parser::new(
            grammar,
            ParserConfig {
                no_replacements: Some("(".into()),
                ..ParserConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ParserError::InvalidRegex { .. }));
    }

    #[test]
    fn config_reads_partial_json() {
        let config: ParserConfig = serde_json::from_str(r#"{"remember_parses": true}"#).unwrap();
        assert!(config.remember_parses);
        assert_eq!(config.max_token_length, MAX_TOKEN_LENGTH);
    }
}
