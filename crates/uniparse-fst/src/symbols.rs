// Symbol table: char-to-index and index-to-char mapping

use hashbrown::HashMap;

use crate::FstError;

/// Interned input alphabet of a transducer.
///
/// Symbols are assigned in first-seen order, so the table of a grammar is
/// stable across rebuilds from the same input.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    char_to_symbol: HashMap<char, u16>,
    symbol_chars: Vec<char>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the symbol of `ch`, assigning a new one if needed.
    pub fn intern(&mut self, ch: char) -> Result<u16, FstError> {
        if let Some(&sym) = self.char_to_symbol.get(&ch) {
            return Ok(sym);
        }
        let sym = u16::try_from(self.symbol_chars.len()).map_err(|_| FstError::SymbolOverflow {
            max: u16::MAX as usize,
        })?;
        self.char_to_symbol.insert(ch, sym);
        self.symbol_chars.push(ch);
        Ok(sym)
    }

    #[inline]
    pub fn get(&self, ch: char) -> Option<u16> {
        self.char_to_symbol.get(&ch).copied()
    }

    #[inline]
    pub fn char_of(&self, sym: u16) -> Option<char> {
        self.symbol_chars.get(sym as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.symbol_chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbol_chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        let mut table = SymbolTable::new();
        let a = table.intern('a').unwrap();
        let b = table.intern('b').unwrap();
        assert_eq!(table.intern('a').unwrap(), a);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.char_of(b), Some('b'));
    }

    #[test]
    fn unknown_char() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.get('x'), None);
        assert_eq!(table.char_of(0), None);
    }
}
