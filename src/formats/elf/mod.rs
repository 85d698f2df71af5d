//! ELF structure catalog.
//!
//! Decoding of headers, program headers, section headers, symbol tables and
//! relocation tables is delegated to the `object` crate (see [`decode`]).
//! The results are copied into a [`StructureCatalog`] of owned records, which
//! is populated once at load time and read by everything else.

pub mod decode;

use serde::{Deserialize, Serialize};

use crate::core::{
    ElfClass, Endianness, ImageType, RelocationTable, Section, Segment, SymbolTable,
};

pub use decode::decode;

/// File header fields the model cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElfHeader {
    pub class: ElfClass,
    pub endianness: Endianness,
    pub image_type: ImageType,
    /// `e_machine`
    pub machine: u16,
    /// `e_entry` as linked
    pub entry: u64,
}

/// Decoded structures of one ELF image, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureCatalog {
    pub header: ElfHeader,
    /// Program headers in table order
    pub segments: Vec<Segment>,
    /// Section headers in table order, including the null section at index 0
    pub sections: Vec<Section>,
    /// Every SHT_SYMTAB and SHT_DYNSYM section, in section order
    pub symbol_tables: Vec<SymbolTable>,
    /// Every SHT_REL and SHT_RELA section, in section order
    pub relocations: Vec<RelocationTable>,
}

impl StructureCatalog {
    /// First section with the given name.
    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Symbol table stored in the section at `section_index`.
    pub fn symbol_table(&self, section_index: usize) -> Option<&SymbolTable> {
        self.symbol_tables
            .iter()
            .find(|t| t.section == section_index)
    }

    /// First relocation section whose `sh_info` names `target`.
    pub fn relocations_for(&self, target: usize) -> Option<&RelocationTable> {
        self.relocations.iter().find(|r| r.target == target)
    }

    /// Lowest non-zero segment virtual address, with the index of the segment
    /// holding it. `None` when every segment sits at address zero.
    pub fn lowest_mapped_segment(&self) -> Option<(usize, u64)> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.vaddr != 0)
            .min_by_key(|(_, s)| s.vaddr)
            .map(|(i, s)| (i, s.vaddr))
    }
}
