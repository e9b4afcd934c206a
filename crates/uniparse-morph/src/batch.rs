// Frequency-list processing over a pool of scoped worker threads

use std::num::NonZeroUsize;
use std::thread;

use uniparse_core::token::{FreqEntry, FreqListError, read_freq_list, sort_freq_list};
use uniparse_core::wordform::Wordform;

use crate::parser::Parser;

/// Error type for batch runs.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("malformed frequency list: {0}")]
    FreqList(#[from] FreqListError),

    #[error("batch worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; `0` picks the available parallelism.
    pub workers: usize,
    pub replacements: usize,
    /// Only the first `max_lines` entries of the list (in file order).
    pub max_lines: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            replacements: 0,
            max_lines: None,
        }
    }
}

/// Analyses of one frequency-list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenResult {
    pub entry: FreqEntry,
    pub analyses: Vec<Wordform>,
}

impl TokenResult {
    pub fn is_parsed(&self) -> bool {
        self.analyses.iter().any(Wordform::is_analyzed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Number of token types processed.
    pub types: usize,
    /// Share of token occurrences with at least one analysis.
    pub parsed_fraction: f64,
    /// Most frequent first.
    pub results: Vec<TokenResult>,
}

impl BatchReport {
    pub fn parsed(&self) -> impl Iterator<Item = &TokenResult> {
        self.results.iter().filter(|r| r.is_parsed())
    }

    pub fn unparsed(&self) -> impl Iterator<Item = &TokenResult> {
        self.results.iter().filter(|r| !r.is_parsed())
    }
}

/// Read a `token<sep>count` list and analyze it.
pub fn parse_freq_list(
    parser: &Parser,
    text: &str,
    separator: &str,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    let entries = read_freq_list(text, separator)?;
    parse_entries(parser, entries, options)
}

/// Analyze frequency entries, most frequent first.
pub fn parse_entries(
    parser: &Parser,
    mut entries: Vec<FreqEntry>,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    if let Some(max) = options.max_lines {
        entries.truncate(max);
    }
    sort_freq_list(&mut entries);

    let workers = match options.workers {
        0 => thread::available_parallelism().map_or(1, NonZeroUsize::get),
        n => n,
    }
    .min(entries.len())
    .max(1);
    let chunk_len = entries.len().div_ceil(workers).max(1);
    log::debug!("parsing {} types on {workers} workers", entries.len());

    let analyses: Vec<Vec<Wordform>> = thread::scope(|scope| {
        let handles: Vec<_> = entries
            .chunks(chunk_len)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut session = parser.session();
                    chunk
                        .iter()
                        .map(|entry| session.parse(&entry.token, options.replacements))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut out = Vec::with_capacity(entries.len());
        for handle in handles {
            out.extend(handle.join().map_err(|_| BatchError::WorkerPanicked)?);
        }
        Ok::<_, BatchError>(out)
    })?;

    let mut parsed: u64 = 0;
    let mut total: u64 = 0;
    let results: Vec<TokenResult> = entries
        .into_iter()
        .zip(analyses)
        .map(|(entry, analyses)| {
            let result = TokenResult { entry, analyses };
            total += result.entry.count;
            if result.is_parsed() {
                parsed += result.entry.count;
            }
            result
        })
        .collect();

    let parsed_fraction = if total == 0 {
        0.0
    } else {
        parsed as f64 / total as f64
    };
    log::info!(
        "{} types, {:.2}% of occurrences parsed",
        results.len(),
        parsed_fraction * 100.0
    );
    Ok(BatchReport {
        types: results.len(),
        parsed_fraction,
        results,
    })
}
