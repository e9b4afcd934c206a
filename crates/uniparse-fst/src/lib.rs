//! Character transducer for stem and affix lookup.
//!
//! Keys (stem starts, affix prefixes, incorporable stems) are compiled into a
//! trie-shaped transducer with a flat, sorted transition table. Traversal is
//! an explicit DFS over configuration frames and can absorb a bounded number
//! of edit operations (substitution, deletion, insertion, adjacent
//! transposition) while matching any substring of the input.
//!
//! # Architecture
//!
//! - [`symbols`] -- Symbol table (char-to-index and index-to-char mapping)
//! - [`transition`] -- Flat transition table and per-state entries
//! - [`builder`] -- Incremental key insertion and freezing
//! - [`config`] -- Traversal configuration (explicit DFS stack)
//! - [`edits`] -- Edit operations and Damerau-Levenshtein distance
//! - [`fst`] -- The frozen transducer and its traversal

pub mod builder;
pub mod config;
pub mod edits;
pub mod fst;
pub mod symbols;
pub mod transition;

pub use builder::FstBuilder;
pub use config::TraversalConfig;
pub use edits::{EditKind, EditOp, damerau_levenshtein};
pub use fst::{Fst, FstMatch};

/// Error type for transducer construction.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("symbol table overflow: more than {max} distinct characters")]
    SymbolOverflow { max: usize },
    #[error("state table overflow")]
    StateOverflow,
    #[error("empty key")]
    EmptyKey,
}

/// Maximum number of frames popped in a single `next` call.
/// Acts as a safety limit for pathological inputs.
pub const MAX_LOOP_COUNT: u32 = 100_000;

/// Trait for transducer traversal.
///
/// The `prepare` + `next` pattern is a coroutine-like interface: `prepare`
/// sets up the configuration for a new input, and each `next` call yields one
/// match.
pub trait Transducer {
    type Config;
    type Output;

    /// Prepare the configuration for traversing the given input characters.
    ///
    /// Returns `true` if all input characters are known symbols. Unknown
    /// characters can still be matched through edit operations or wildcards.
    fn prepare(&self, config: &mut Self::Config, input: &[char]) -> bool;

    /// Yield the next match.
    ///
    /// Returns `false` when no more matches exist (or the loop limit was
    /// reached).
    fn next(&self, config: &mut Self::Config, output: &mut Self::Output) -> bool;
}
