//! `ElfImage`: one ELF file loaded as a patchable, rebasable address space.
//!
//! The image owns a private copy-on-write buffer of the file, the structure
//! catalog decoded from it at load time and the [`AddressSpace`] derived from
//! the catalog. Writes change the buffer only; the catalog is not re-decoded,
//! so patching header bytes does not move segments or symbols.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::analysis::memory::{read_at, write_at};
use crate::analysis::{AddressMap, AddressSpace, MemoryView, Search};
use crate::config::LoadConfig;
use crate::core::{ElfClass, Endianness, ImageType, Section, Segment};
use crate::error::{ElfError, Result};
use crate::formats::elf::{self, StructureCatalog};
use crate::io::ImageBuffer;
use crate::libs::{Libraries, LddResolver, LibraryResolver};

pub struct ElfImage {
    path: Option<PathBuf>,
    buffer: ImageBuffer,
    catalog: StructureCatalog,
    space: AddressSpace,
    libraries: Libraries,
}

impl ElfImage {
    /// Load `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, &LoadConfig::default())
    }

    /// Load `path`, resolving shared libraries too when
    /// `config.libraries.resolve_on_load` is set.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &LoadConfig) -> Result<Self> {
        config.validate()?;
        let path = std::fs::canonicalize(path.as_ref())?;
        let buffer = ImageBuffer::open(&path, &config.io)?;
        let mut image = Self::from_buffer(Some(path), buffer)?;

        if config.libraries.resolve_on_load {
            image.resolve_libraries(&LddResolver::from_config(&config.libraries))?;
        }
        Ok(image)
    }

    /// Model an image that is already in memory. It has no path, so library
    /// resolution is unavailable.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_buffer(None, ImageBuffer::from_bytes(data))
    }

    fn from_buffer(path: Option<PathBuf>, buffer: ImageBuffer) -> Result<Self> {
        let catalog = elf::decode(&buffer)?;
        let space = AddressSpace::from_catalog(&catalog);
        info!(
            path = ?path,
            class = %catalog.header.class,
            image_type = %catalog.header.image_type,
            base = space.base_address(),
            load_segments = catalog.segments.iter().filter(|s| s.is_load()).count(),
            symbols = space.symbols().len(),
            plt = space.plt().len(),
            "Loaded ELF image"
        );
        Ok(Self {
            path,
            buffer,
            catalog,
            space,
            libraries: Libraries::new(),
        })
    }

    /// Absolute, canonical path of the file, `None` for in-memory images.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn elf_class(&self) -> ElfClass {
        self.catalog.header.class
    }

    pub fn image_type(&self) -> ImageType {
        self.catalog.header.image_type
    }

    pub fn machine(&self) -> u16 {
        self.catalog.header.machine
    }

    /// Structures as decoded at load time, before any rebase.
    pub fn catalog(&self) -> &StructureCatalog {
        &self.catalog
    }

    pub fn segments(&self) -> &[Segment] {
        self.space.segments()
    }

    pub fn sections(&self) -> &[Section] {
        self.space.sections()
    }

    pub fn executable_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments().iter().filter(|s| s.is_executable())
    }

    pub fn writable_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments().iter().filter(|s| s.is_writable())
    }

    /// Current buffer bytes of the named section.
    ///
    /// `None` when no section has that name. `SHT_NOBITS` sections and
    /// sections lying outside the file yield an empty slice.
    pub fn section_data(&self, name: &str) -> Option<&[u8]> {
        let section = self.catalog.section_by_name(name)?;
        let Some((offset, size)) = section.file_range() else {
            return Some(&[]);
        };
        let len = self.buffer.len() as u64;
        let start = offset.min(len) as usize;
        let end = offset.saturating_add(size).min(len) as usize;
        Some(&self.buffer[start..end])
    }

    pub fn symbols(&self) -> &AddressMap {
        self.space.symbols()
    }

    pub fn plt(&self) -> &AddressMap {
        self.space.plt()
    }

    pub fn got(&self) -> &AddressMap {
        self.space.got()
    }

    /// Libraries found by the last successful [`resolve_libraries`](Self::resolve_libraries).
    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    /// Ask `resolver` which libraries this image loads and store the answer.
    pub fn resolve_libraries(&mut self, resolver: &dyn LibraryResolver) -> Result<&Libraries> {
        let path = self.path.as_deref().ok_or_else(|| {
            ElfError::Subprocess("in-memory image has no file to trace".to_string())
        })?;
        let libraries = resolver.resolve(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Library resolution failed");
        })?;
        debug!(libraries = libraries.len(), "Stored library bases");
        self.libraries = libraries;
        Ok(&self.libraries)
    }

    pub fn offset_to_address(&self, offset: u64) -> Option<u64> {
        self.space.translator().offset_to_address(offset)
    }

    pub fn address_to_offset(&self, address: u64) -> Option<u64> {
        self.space.translator().address_to_offset(address)
    }

    /// Addresses of every occurrence of `pattern` in segment contents.
    ///
    /// Writable segments only unless `include_non_writable` is set.
    pub fn search<'p>(&self, pattern: &'p [u8], include_non_writable: bool) -> Search<'_, 'p> {
        self.space
            .translator()
            .search(&self.buffer, pattern, include_non_writable)
    }

    pub fn base_address(&self) -> u64 {
        self.space.base_address()
    }

    /// Rebase the whole image so its base sits at `new_base`.
    ///
    /// Segment and section addresses, symbols, PLT and GOT all move by the
    /// same delta. Library bases are not touched.
    ///
    /// Addresses are 64-bit and wrap for both classes, so an ELF32 image can
    /// end up past the 32-bit range. That is logged, not rejected.
    pub fn set_base_address(&mut self, new_base: u64) {
        self.space.set_base_address(new_base);
        if !self.addresses_fit_class() {
            warn!(
                base = new_base,
                end = self.space.end_address(),
                class = %self.elf_class(),
                "Rebased image extends past its class's address range"
            );
        }
    }

    /// Whether every loadable segment ends within the class's address width.
    pub fn addresses_fit_class(&self) -> bool {
        match self.elf_class() {
            ElfClass::Elf32 => self.space.end_address() <= 1 << 32,
            ElfClass::Elf64 => true,
        }
    }

    /// Read up to `len` bytes at `address`.
    pub fn read(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        read_at(&self.space.translator(), &self.buffer, address, len)
    }

    /// Overwrite bytes at `address` in the private buffer.
    ///
    /// The write is not confined to the segment containing `address`.
    pub fn write(&mut self, address: u64, data: &[u8]) -> Result<()> {
        write_at(&self.space.translator(), &mut self.buffer, address, data)
    }

    /// Write the current, possibly patched, bytes to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.buffer.persist_to(path)?;
        Ok(())
    }
}

impl MemoryView for ElfImage {
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        self.read(address, len)
    }

    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()> {
        self.write(address, data)
    }

    fn endianness(&self) -> Endianness {
        self.catalog.header.endianness
    }
}

impl std::fmt::Debug for ElfImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElfImage")
            .field("path", &self.path)
            .field("class", &self.catalog.header.class)
            .field("image_type", &self.catalog.header.image_type)
            .field("base", &format_args!("{:#x}", self.space.base_address()))
            .field("size", &self.buffer.size())
            .finish()
    }
}
