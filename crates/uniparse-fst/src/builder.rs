// Incremental key insertion and freezing into the flat layout

use crate::FstError;
use crate::fst::Fst;
use crate::symbols::SymbolTable;
use crate::transition::{StateEntry, Transition};

#[derive(Debug, Default)]
struct BuildNode {
    arcs: Vec<(u16, u32)>,
    finals: Vec<u32>,
}

/// Collects `(key, value)` pairs; several values may share a key.
#[derive(Debug)]
pub struct FstBuilder<T> {
    nodes: Vec<BuildNode>,
    values: Vec<T>,
    symbols: SymbolTable,
    allow_empty_keys: bool,
}

impl<T> Default for FstBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FstBuilder<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![BuildNode::default()],
            values: Vec::new(),
            symbols: SymbolTable::new(),
            allow_empty_keys: false,
        }
    }

    /// Builder whose root may be final. Affix tables use this for
    /// inflexions without leading surface material.
    pub fn with_empty_keys() -> Self {
        Self {
            allow_empty_keys: true,
            ..Self::new()
        }
    }

    pub fn insert(&mut self, key: &[char], value: T) -> Result<(), FstError> {
        if key.is_empty() && !self.allow_empty_keys {
            return Err(FstError::EmptyKey);
        }
        let mut state = 0usize;
        for &ch in key {
            let sym = self.symbols.intern(ch)?;
            let existing = self.nodes[state]
                .arcs
                .iter()
                .find(|(s, _)| *s == sym)
                .map(|&(_, target)| target);
            state = match existing {
                Some(target) => target as usize,
                None => {
                    let target =
                        u32::try_from(self.nodes.len()).map_err(|_| FstError::StateOverflow)?;
                    self.nodes.push(BuildNode::default());
                    self.nodes[state].arcs.push((sym, target));
                    target as usize
                }
            };
        }
        let value_index = u32::try_from(self.values.len()).map_err(|_| FstError::StateOverflow)?;
        self.values.push(value);
        self.nodes[state].finals.push(value_index);
        Ok(())
    }

    pub fn insert_str(&mut self, key: &str, value: T) -> Result<(), FstError> {
        let chars: Vec<char> = key.chars().collect();
        self.insert(&chars, value)
    }

    /// Number of inserted values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Freeze into the flat, sorted layout.
    pub fn build(self) -> Fst<T> {
        let mut states = Vec::with_capacity(self.nodes.len());
        let mut transitions = Vec::new();
        let mut finals = Vec::new();
        for mut node in self.nodes {
            node.arcs.sort_unstable_by_key(|&(sym, _)| sym);
            states.push(StateEntry {
                first_transition: transitions.len() as u32,
                transition_count: node.arcs.len() as u32,
                first_final: finals.len() as u32,
                final_count: node.finals.len() as u32,
            });
            transitions.extend(node.arcs.iter().map(|&(sym, target)| Transition { sym, target }));
            finals.extend(node.finals);
        }
        Fst::from_parts(states, transitions, finals, self.values, self.symbols)
    }
}
