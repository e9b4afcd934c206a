// Per-session memo of finished parses

use hashbrown::HashMap;
use uniparse_core::wordform::Wordform;

/// Default number of cached tokens.
pub const DEFAULT_CACHE_CAPACITY: usize = 65_536;

/// Bounded map from `(token, replacements)` to the final analyses.
///
/// The cache uses a simple replacement strategy: once `capacity` entries are
/// stored the whole map is dropped before the next insert (no LRU).
#[derive(Debug, Clone)]
pub struct ParseCache {
    capacity: usize,
    entries: HashMap<(String, usize), Vec<Wordform>>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, token: &str, replacements: usize) -> Option<&[Wordform]> {
        self.entries
            .get(&(token.to_string(), replacements))
            .map(Vec::as_slice)
    }

    /// Store the analyses of `token`. A zero capacity disables caching.
    pub fn store(&mut self, token: &str, replacements: usize, analyses: &[Wordform]) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            log::debug!("parse cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries
            .insert((token.to_string(), replacements), analyses.to_vec());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
