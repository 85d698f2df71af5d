//! Uniform rebasing of an [`AddressSpace`].
//!
//! The delta is computed once from the prior base. Every derived address is
//! shifted into a fresh `AddressSpace` and the caller swaps it in with a
//! single assignment, so readers never observe a half-rebased model.
//! Arithmetic is modular (wrapping) on 64 bits, which keeps rebases
//! composable: `b1` then `b2` lands exactly where `b2` alone would.

use tracing::{debug, error};

use super::space::AddressSpace;
use super::symbols::AddressMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebaser {
    from: u64,
    to: u64,
    delta: u64,
}

impl Rebaser {
    pub fn new(from: u64, to: u64) -> Self {
        Self {
            from,
            to,
            delta: to.wrapping_sub(from),
        }
    }

    /// Two's-complement delta; add with `wrapping_add`.
    pub fn delta(&self) -> u64 {
        self.delta
    }

    pub fn is_noop(&self) -> bool {
        self.delta == 0
    }

    pub fn shift(&self, address: u64) -> u64 {
        address.wrapping_add(self.delta)
    }

    fn shift_map(&self, map: &AddressMap) -> AddressMap {
        map.iter()
            .map(|(name, addr)| (name.clone(), self.shift(*addr)))
            .collect()
    }

    /// A copy of `space` with every address moved by the delta.
    pub fn apply(&self, space: &AddressSpace) -> AddressSpace {
        if self.is_noop() {
            return space.clone();
        }

        let mut segments = space.segments.clone();
        for segment in &mut segments {
            segment.vaddr = self.shift(segment.vaddr);
        }
        let mut sections = space.sections.clone();
        for section in &mut sections {
            section.addr = self.shift(section.addr);
        }

        let rebased = AddressSpace {
            base: self.to,
            anchor: space.anchor,
            segments,
            sections,
            symbols: self.shift_map(&space.symbols),
            plt: self.shift_map(&space.plt),
            got: self.shift_map(&space.got),
        };

        if !rebased.anchor_holds() {
            // Only reachable if the space was built inconsistently.
            error!(
                from = self.from,
                to = self.to,
                "Rebase broke the base-address invariant"
            );
            debug_assert!(false, "anchor segment no longer at base after rebase");
        }

        debug!(
            from = self.from,
            to = self.to,
            delta = self.delta() as i64,
            symbols = rebased.symbols.len(),
            "Rebased address space"
        );
        rebased
    }
}
