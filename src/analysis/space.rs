//! The rebasable part of an image model.
//!
//! `AddressSpace` owns every address-bearing derived structure: segment and
//! section virtual addresses plus the symbol, PLT and GOT maps. It is built
//! once from the catalog and afterwards only replaced wholesale by the
//! [`Rebaser`](super::rebase::Rebaser).

use serde::{Deserialize, Serialize};

use super::rebase::Rebaser;
use super::symbols::{AddressMap, SymbolResolver};
use super::translate::AddressTranslator;
use crate::core::{Section, Segment};
use crate::formats::elf::StructureCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSpace {
    /// Lowest non-zero segment address at load time, shifted by every rebase
    pub(crate) base: u64,
    /// Index of the segment that defined `base`
    pub(crate) anchor: Option<usize>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) sections: Vec<Section>,
    pub(crate) symbols: AddressMap,
    pub(crate) plt: AddressMap,
    pub(crate) got: AddressMap,
}

impl AddressSpace {
    pub fn from_catalog(catalog: &StructureCatalog) -> Self {
        let resolved = SymbolResolver::new(catalog).resolve();
        let (anchor, base) = match catalog.lowest_mapped_segment() {
            Some((index, vaddr)) => (Some(index), vaddr),
            None => (None, 0),
        };
        Self {
            base,
            anchor,
            segments: catalog.segments.clone(),
            sections: catalog.sections.clone(),
            symbols: resolved.symbols,
            plt: resolved.plt,
            got: resolved.got,
        }
    }

    pub fn base_address(&self) -> u64 {
        self.base
    }

    /// Move the whole space so that its base sits at `new_base`.
    pub fn set_base_address(&mut self, new_base: u64) {
        let rebased = Rebaser::new(self.base, new_base).apply(self);
        *self = rebased;
    }

    /// One past the highest address covered by a loadable segment.
    pub fn end_address(&self) -> u64 {
        self.segments
            .iter()
            .filter(|s| s.is_load())
            .map(|s| s.vaddr.saturating_add(s.mem_size))
            .max()
            .unwrap_or(self.base)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn symbols(&self) -> &AddressMap {
        &self.symbols
    }

    pub fn plt(&self) -> &AddressMap {
        &self.plt
    }

    pub fn got(&self) -> &AddressMap {
        &self.got
    }

    pub fn translator(&self) -> AddressTranslator<'_> {
        AddressTranslator::new(&self.segments)
    }

    /// The anchor segment sits exactly at `base`.
    pub(crate) fn anchor_holds(&self) -> bool {
        match self.anchor {
            Some(index) => self.segments.get(index).map(|s| s.vaddr) == Some(self.base),
            None => true,
        }
    }
}
