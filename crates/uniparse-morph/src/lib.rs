//! Rule-based morphological analyzer.
//!
//! A grammar (paradigms, derivations, lexemes, clitics, lexical rules) is
//! compiled into an immutable [`Grammar`]; a [`Parser`] indexes its stems and
//! affixes and analyzes tokens against it, tolerating a bounded number of
//! edit operations on request.
//!
//! # Architecture
//!
//! - [`grammar`] -- Grammar model, descriptors and the compiler
//! - [`morphology`] -- Stem/affix indices, matching engine, clitic splitting,
//!   post-processing
//! - [`parser`] -- Parser handle, configuration and per-worker sessions
//! - [`cache`] -- Per-session parse memo
//! - [`batch`] -- Frequency-list processing (feature `batch`)
//! - [`disambiguation`] -- Constraint Grammar bridge (feature `cg`)

pub mod cache;
pub mod grammar;
pub mod morphology;
pub mod parser;

#[cfg(feature = "batch")]
pub mod batch;
#[cfg(feature = "cg")]
pub mod disambiguation;

pub use cache::ParseCache;
pub use grammar::{CompiledGrammar, Grammar, GrammarBuilder, GrammarConfig, GrammarError};
pub use morphology::{Analyzer, MorphAnalyzer, StepBudget};
pub use parser::{Parser, ParserConfig, ParserError, Session};
pub use uniparse_core::wordform::{FormatConfig, Wordform};

#[cfg(feature = "batch")]
pub use batch::{BatchError, BatchOptions, BatchReport, parse_freq_list};
#[cfg(feature = "cg")]
pub use disambiguation::{CgDisambiguator, DisambiguationError};
