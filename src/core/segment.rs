//! Segment type for load-time memory mapping units.
//!
//! Segments correspond to ELF program headers: they describe how a range of
//! file bytes is placed in the virtual address space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission flags for memory segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perms {
    /// Raw permission bits: read=1, write=2, execute=4
    pub bits: u8,
}

impl Perms {
    /// Create a new Perms instance
    pub fn new(read: bool, write: bool, execute: bool) -> Self {
        let mut bits = 0u8;
        if read {
            bits |= 1;
        }
        if write {
            bits |= 2;
        }
        if execute {
            bits |= 4;
        }
        Self { bits }
    }

    /// Translate ELF `p_flags` (PF_X=1, PF_W=2, PF_R=4).
    pub fn from_p_flags(p_flags: u32) -> Self {
        Self::new(
            p_flags & object::elf::PF_R != 0,
            p_flags & object::elf::PF_W != 0,
            p_flags & object::elf::PF_X != 0,
        )
    }

    /// Check if segment has read permission
    pub fn has_read(&self) -> bool {
        (self.bits & 1) != 0
    }

    /// Check if segment has write permission
    pub fn has_write(&self) -> bool {
        (self.bits & 2) != 0
    }

    /// Check if segment has execute permission
    pub fn has_execute(&self) -> bool {
        (self.bits & 4) != 0
    }
}

impl fmt::Display for Perms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut perms = String::new();
        perms.push(if self.has_read() { 'r' } else { '-' });
        perms.push(if self.has_write() { 'w' } else { '-' });
        perms.push(if self.has_execute() { 'x' } else { '-' });
        write!(f, "{}", perms)
    }
}

/// One program header.
///
/// `offset..offset+file_size` is the file range and `vaddr..vaddr+mem_size`
/// the memory range; decoding guarantees `file_size <= mem_size`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the program header table
    pub index: usize,
    /// `p_type` (PT_LOAD, PT_DYNAMIC, ...)
    pub kind: u32,
    pub offset: u64,
    pub file_size: u64,
    pub vaddr: u64,
    pub mem_size: u64,
    pub align: u64,
    pub perms: Perms,
}

impl Segment {
    /// Closed file range test, `[offset, offset + file_size]`.
    ///
    /// The end is inclusive so that the offset one past the last byte still
    /// translates; lookups take the first matching segment.
    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.offset && offset - self.offset <= self.file_size
    }

    /// Closed memory range test, `[vaddr, vaddr + mem_size]`.
    pub fn contains_address(&self, address: u64) -> bool {
        address >= self.vaddr && address - self.vaddr <= self.mem_size
    }

    pub fn is_load(&self) -> bool {
        self.kind == object::elf::PT_LOAD
    }

    pub fn is_writable(&self) -> bool {
        self.perms.has_write()
    }

    pub fn is_executable(&self) -> bool {
        self.perms.has_execute()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment #{} {:#x}..{:#x} {} (file {:#x}+{:#x})",
            self.index,
            self.vaddr,
            self.vaddr.wrapping_add(self.mem_size),
            self.perms,
            self.offset,
            self.file_size
        )
    }
}
