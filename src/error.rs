//! Error types for the elfspace address-space model.
//!
//! This module provides structured error handling using thiserror. Lookups
//! that merely miss (offset/address translation, missing PLT) are not errors
//! and are reported through `Option` or empty maps instead.

use crate::io::error::IoError;
use thiserror::Error;

/// Main error type for elfspace operations.
#[derive(Debug, Error)]
pub enum ElfError {
    /// The input is not an ELF image we can model
    #[error("Invalid ELF image: {0}")]
    InvalidFormat(String),

    /// Structure decoding failed inside the ELF parser
    #[error("ELF parse error: {0}")]
    Parse(#[from] object::read::Error),

    /// Backing buffer errors (open, map, limits)
    #[error("Image buffer error: {0}")]
    Buffer(#[from] IoError),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Virtual address is not covered by any segment
    #[error("Address {0:#x} is not mapped by any segment")]
    AddressNotMapped(u64),

    /// A write would run past the end of the image buffer
    #[error("Write of {len} bytes at offset {offset:#x} exceeds image size {size:#x}")]
    WriteOutOfBounds { offset: u64, len: usize, size: u64 },

    /// A typed read reached the end of the image before filling its value
    #[error("Short read at {address:#x}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        address: u64,
        wanted: usize,
        got: usize,
    },

    /// The library-resolution subprocess failed
    #[error("Subprocess failed: {0}")]
    Subprocess(String),

    /// An operation exceeded its time budget
    #[error("Operation timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for elfspace operations
pub type Result<T> = std::result::Result<T, ElfError>;

impl ElfError {
    /// Whether the error came from the library-resolution subprocess,
    /// including it running past its time budget.
    pub fn is_subprocess_failure(&self) -> bool {
        matches!(self, ElfError::Subprocess(_) | ElfError::Timeout { .. })
    }
}
