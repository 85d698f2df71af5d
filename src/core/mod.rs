//! Core data types for the elfspace model.
//!
//! Plain, owned, serializable records. They carry no references into the
//! image buffer or the ELF parser, so the rest of the crate can copy and
//! rebase them freely.

pub mod binary;
pub mod relocation;
pub mod section;
pub mod segment;
pub mod symbol;

pub use binary::{ElfClass, Endianness, ImageType};
pub use relocation::{RelocationEntry, RelocationTable};
pub use section::Section;
pub use segment::{Perms, Segment};
pub use symbol::{Symbol, SymbolTable};
