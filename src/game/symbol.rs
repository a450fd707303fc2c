//! Reel Symbols
//!
//! A symbol is an opaque interned identifier; only equality matters to the
//! game rules. In the original presentation a symbol was a sprite asset, so
//! configuration refers to symbols by name and the [`SymbolTable`] maps
//! those names to compact ids. Reels sharing a name share the [`Symbol`].

use serde::{Deserialize, Serialize};

/// An interned reel symbol.
///
/// Implements `Ord` only for deterministic collection ordering; the game
/// rules never compare symbols for anything but equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// Index of this symbol in its owning [`SymbolTable`].
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interner mapping configured symbol names to [`Symbol`] ids.
///
/// Lookups are linear scans; palettes hold a handful of symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    names: Vec<String>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a symbol name, returning the existing id if already known.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            return Symbol(pos as u32);
        }
        self.names.push(name.to_owned());
        Symbol((self.names.len() - 1) as u32)
    }

    /// Look up an already-interned name.
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|pos| Symbol(pos as u32))
    }

    /// Name of a symbol, if it belongs to this table.
    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.names.get(symbol.index()).map(String::as_str)
    }

    /// Number of distinct symbols interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut table = SymbolTable::new();

        let cherry = table.intern("Cherry");
        let lemon = table.intern("Lemon");
        let cherry_again = table.intern("Cherry");

        assert_eq!(cherry, cherry_again);
        assert_ne!(cherry, lemon);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lookup_and_name() {
        let mut table = SymbolTable::new();
        let bell = table.intern("Bell");

        assert_eq!(table.lookup("Bell"), Some(bell));
        assert_eq!(table.lookup("Seven"), None);
        assert_eq!(table.name(bell), Some("Bell"));
    }

    #[test]
    fn test_empty_table() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup("anything"), None);
    }
}
