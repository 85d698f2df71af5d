//! Image-level descriptors: byte class, image type and endianness.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ELF byte class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElfClass {
    /// ELFCLASS32
    Elf32,
    /// ELFCLASS64
    Elf64,
}

impl ElfClass {
    /// Address width in bits (32 or 64).
    pub fn bits(&self) -> u32 {
        match self {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 64,
        }
    }
}

impl fmt::Display for ElfClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ELF{}", self.bits())
    }
}

/// Object file type from `e_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    /// ET_NONE
    None,
    /// ET_REL: relocatable object
    Relocatable,
    /// ET_EXEC: fixed-address executable
    Executable,
    /// ET_DYN: shared object or position-independent executable
    SharedObject,
    /// ET_CORE: core dump
    Core,
    /// OS- or processor-specific type
    Other(u16),
}

impl ImageType {
    pub fn from_e_type(e_type: u16) -> Self {
        match e_type {
            object::elf::ET_NONE => ImageType::None,
            object::elf::ET_REL => ImageType::Relocatable,
            object::elf::ET_EXEC => ImageType::Executable,
            object::elf::ET_DYN => ImageType::SharedObject,
            object::elf::ET_CORE => ImageType::Core,
            other => ImageType::Other(other),
        }
    }

    /// Short conventional name (`EXEC`, `DYN`, ...).
    pub fn short_name(&self) -> String {
        match self {
            ImageType::None => "NONE".to_string(),
            ImageType::Relocatable => "REL".to_string(),
            ImageType::Executable => "EXEC".to_string(),
            ImageType::SharedObject => "DYN".to_string(),
            ImageType::Core => "CORE".to_string(),
            ImageType::Other(v) => format!("{:#06x}", v),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Byte order of multi-byte values in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

impl From<object::Endianness> for Endianness {
    fn from(value: object::Endianness) -> Self {
        match value {
            object::Endianness::Little => Endianness::Little,
            object::Endianness::Big => Endianness::Big,
        }
    }
}
