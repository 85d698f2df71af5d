//! Section type for file-format organizational units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One section header, name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Section {
    /// Position in the section header table
    pub index: usize,
    pub name: String,
    /// `sh_type` (SHT_PROGBITS, SHT_RELA, ...)
    pub kind: u32,
    pub flags: u64,
    /// Virtual address; zero when the section is not loaded
    pub addr: u64,
    pub offset: u64,
    pub size: u64,
    /// `sh_link`: associated string/symbol table
    pub link: u32,
    /// `sh_info`: for relocation sections, the section they apply to
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

impl Section {
    pub fn is_alloc(&self) -> bool {
        self.flags & u64::from(object::elf::SHF_ALLOC) != 0
    }

    /// SHT_NOBITS sections (.bss) occupy no file bytes.
    pub fn is_nobits(&self) -> bool {
        self.kind == object::elf::SHT_NOBITS
    }

    pub fn is_relocation(&self) -> bool {
        self.kind == object::elf::SHT_REL || self.kind == object::elf::SHT_RELA
    }

    pub fn is_symbol_table(&self) -> bool {
        self.kind == object::elf::SHT_SYMTAB || self.kind == object::elf::SHT_DYNSYM
    }

    /// File range of the section contents, if it has any.
    pub fn file_range(&self) -> Option<(u64, u64)> {
        if self.is_nobits() || self.kind == object::elf::SHT_NULL {
            None
        } else {
            Some((self.offset, self.size))
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Section #{} '{}' at {:#x} (size {:#x})",
            self.index, self.name, self.addr, self.size
        )
    }
}
