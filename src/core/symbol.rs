//! Symbol-table entries as decoded from SHT_SYMTAB / SHT_DYNSYM sections.

use serde::{Deserialize, Serialize};

/// A single symbol-table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// `st_value`; zero for undefined and most section symbols
    pub value: u64,
    pub size: u64,
    /// Index of the defining section, if the symbol is defined in one
    pub section: Option<usize>,
}

impl Symbol {
    /// Entries that contribute to the name→address map.
    pub fn has_address(&self) -> bool {
        self.value != 0 && !self.name.is_empty()
    }
}

/// Entries of one symbol-table section, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Index of the SHT_SYMTAB / SHT_DYNSYM section
    pub section: usize,
    /// Entries indexed by symbol index (entry 0 is the null symbol)
    pub symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
