//! Relocation entries as decoded from SHT_REL / SHT_RELA sections.
//!
//! Only the fields needed to derive the PLT and GOT maps are kept.

use serde::{Deserialize, Serialize};

/// A single relocation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelocationEntry {
    /// `r_offset`: the address patched by the loader (a GOT slot for JUMP_SLOT)
    pub offset: u64,
    /// Symbol index into the linked symbol table; `None` for index 0
    pub symbol: Option<usize>,
}

/// One relocation section and its entries in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationTable {
    /// Index of the SHT_REL / SHT_RELA section
    pub section: usize,
    /// `sh_link`: the symbol table the entries refer to
    pub symbol_table: usize,
    /// `sh_info`: the section the relocations apply to
    pub target: usize,
    pub entries: Vec<RelocationEntry>,
}
