//! Address-space model derived from the structure catalog.
//!
//! `translate` maps file offsets to virtual addresses and searches mapped
//! bytes, `symbols` derives the symbol/PLT/GOT maps, `space` holds all
//! rebasable state, `rebase` moves it, and `memory` reads and patches bytes
//! by virtual address.

pub mod memory;
pub mod rebase;
pub mod space;
pub mod symbols;
pub mod translate;

pub use memory::MemoryView;
pub use rebase::Rebaser;
pub use space::AddressSpace;
pub use symbols::{AddressMap, SymbolResolver};
pub use translate::{AddressTranslator, Search};
