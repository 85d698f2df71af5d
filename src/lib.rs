//! elfspace: an ELF image as a patchable, rebasable virtual address space.
//!
//! ```no_run
//! use elfspace::ElfImage;
//!
//! # fn main() -> elfspace::Result<()> {
//! let mut image = ElfImage::open("/bin/true")?;
//! let base = image.base_address();
//! image.set_base_address(base + 0x10000);
//! for address in image.search(b"\x7fELF", true) {
//!     println!("{:#x}", address);
//! }
//! # Ok(())
//! # }
//! ```

/// Address-space model: translation, symbols, rebase, reads and writes
pub mod analysis;
/// Load configuration
pub mod config;
/// Core data types module
pub mod core;
/// Error types
pub mod error;
/// Format decoders
pub mod formats;
/// The `ElfImage` facade
pub mod image;
/// Copy-on-write image buffers
pub mod io;
/// Shared-library resolution
pub mod libs;
/// Logging and tracing setup
pub mod logging;
/// Timeouts for external operations
pub mod timeout;

pub use analysis::{AddressMap, AddressSpace, AddressTranslator, MemoryView, Rebaser, Search};
pub use config::{LibraryConfig, LoadConfig};
pub use core::{ElfClass, Endianness, ImageType, Perms, Section, Segment, Symbol};
pub use error::{ElfError, Result};
pub use image::ElfImage;
pub use io::IOLimits;
pub use libs::{parse_trace, LddResolver, Libraries, LibraryResolver};
