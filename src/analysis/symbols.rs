//! Symbol, PLT and GOT maps derived from the structure catalog.
//!
//! PLT addresses are an approximation: the stub for the i-th relocation of
//! the PLT's relocation section is assumed to live at
//! `.plt + i * .plt.sh_addralign`. That holds only for lazy-binding layouts
//! whose stubs follow relocation order with a uniform stride equal to the
//! section alignment. No stub disassembly is attempted.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::RelocationTable;
use crate::formats::elf::StructureCatalog;

/// Name → address map.
pub type AddressMap = BTreeMap<String, u64>;

/// Relocation section names tried when no section's `sh_info` points at `.plt`.
const PLT_RELOCATION_NAMES: [&str; 2] = [".rela.plt", ".rel.plt"];

/// The three derived maps, before any rebase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSymbols {
    pub symbols: AddressMap,
    pub plt: AddressMap,
    pub got: AddressMap,
}

/// Builds symbol, PLT and GOT maps from relocation and symbol-table sections.
pub struct SymbolResolver<'a> {
    catalog: &'a StructureCatalog,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(catalog: &'a StructureCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self) -> ResolvedSymbols {
        let (plt, got) = self.plt_and_got();
        let symbols = self.symbols(&plt);
        debug!(
            symbols = symbols.len(),
            plt = plt.len(),
            got = got.len(),
            "Resolved symbol maps"
        );
        ResolvedSymbols { symbols, plt, got }
    }

    /// PLT and GOT maps, both empty when the image has no `.plt` or no
    /// relocation section for it (static binaries, relocatable objects).
    pub fn plt_and_got(&self) -> (AddressMap, AddressMap) {
        let mut plt = AddressMap::new();
        let mut got = AddressMap::new();

        let Some(plt_section) = self.catalog.section_by_name(".plt") else {
            debug!("No .plt section; PLT and GOT maps are empty");
            return (plt, got);
        };
        let Some(relocations) = self.plt_relocations(plt_section.index) else {
            debug!("No relocation section for .plt; PLT and GOT maps are empty");
            return (plt, got);
        };
        let Some(symtab) = self.catalog.symbol_table(relocations.symbol_table) else {
            debug!(
                link = relocations.symbol_table,
                "PLT relocations link to a missing symbol table"
            );
            return (plt, got);
        };

        for (i, entry) in relocations.entries.iter().enumerate() {
            let Some(symbol) = entry.symbol.and_then(|idx| symtab.get(idx)) else {
                continue;
            };
            if symbol.name.is_empty() {
                continue;
            }
            let stub = plt_section
                .addr
                .wrapping_add((i as u64).wrapping_mul(plt_section.addralign));
            got.insert(symbol.name.clone(), entry.offset);
            plt.insert(symbol.name.clone(), stub);
        }
        (plt, got)
    }

    fn plt_relocations(&self, plt_index: usize) -> Option<&'a RelocationTable> {
        if let Some(table) = self.catalog.relocations_for(plt_index) {
            return Some(table);
        }
        // Newer linkers point .rela.plt's sh_info at .got.plt instead of .plt.
        self.catalog.relocations.iter().find(|table| {
            self.catalog
                .section(table.section)
                .is_some_and(|s| PLT_RELOCATION_NAMES.contains(&s.name.as_str()))
        })
    }

    /// The PLT map overlaid with every addressed symbol-table entry.
    ///
    /// Tables are applied in section order, entries in table order, so later
    /// definitions replace earlier ones and real symbols replace PLT seeds.
    pub fn symbols(&self, plt: &AddressMap) -> AddressMap {
        let mut symbols = plt.clone();
        for table in &self.catalog.symbol_tables {
            for symbol in table.symbols.iter().filter(|s| s.has_address()) {
                symbols.insert(symbol.name.clone(), symbol.value);
            }
        }
        symbols
    }
}
