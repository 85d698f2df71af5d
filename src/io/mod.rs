//! Copy-on-write image buffer.
//!
//! `ImageBuffer` owns the bytes of an ELF image. Files are mapped privately
//! (`MAP_PRIVATE`), so writes land in process-private pages and never reach
//! the file on disk. Several buffers can map the same file without copying
//! it up front; each sees only its own writes. `persist_to` is the only way
//! patched bytes leave the process.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::{MmapMut, MmapOptions};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::{debug, warn};

/// Defines the resource limits for opening images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024 * 1024, // 1GB
        }
    }
}

enum Backing {
    Mapped(MmapMut),
    Owned(Vec<u8>),
}

/// Read/write byte view over an image with copy-on-write semantics.
pub struct ImageBuffer {
    backing: Backing,
}

impl ImageBuffer {
    /// Maps `path` privately, copy-on-write.
    ///
    /// Fails if the file is empty or larger than `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Mapping image copy-on-write"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }
        if file_size == 0 {
            return Err(IoError::EmptyFile);
        }

        // Safety: the mapping is private, so writes never reach the file. Concurrent
        // truncation of the file by another process is outside what we can guard against.
        let map = unsafe { MmapOptions::new().map_copy(&file)? };
        Ok(Self {
            backing: Backing::Mapped(map),
        })
    }

    /// Wraps bytes that are already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            backing: Backing::Owned(data),
        }
    }

    /// Size of the image in bytes.
    pub fn size(&self) -> u64 {
        self.len() as u64
    }

    /// Whether the buffer is backed by a private file mapping.
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped(_))
    }

    /// Writes the current (possibly patched) bytes to `path`.
    pub fn persist_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self[..])?;
        debug!(path = %path.display(), size = self.size(), "Persisted image buffer");
        Ok(())
    }
}

impl Deref for ImageBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(map) => &map[..],
            Backing::Owned(bytes) => &bytes[..],
        }
    }
}

impl DerefMut for ImageBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.backing {
            Backing::Mapped(map) => &mut map[..],
            Backing::Owned(bytes) => &mut bytes[..],
        }
    }
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("size", &self.size())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}
