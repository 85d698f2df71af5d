use crate::common::layout::*;
use crate::common::ElfBuilder;
use elfspace::ElfImage;

#[test]
fn test_plt_follows_relocation_order() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    let plt = image.plt();
    assert_eq!(plt.len(), 2);
    assert_eq!(plt["puts"], 0x400000 + PLT_OFFSET);
    assert_eq!(plt["exit"], 0x400000 + PLT_OFFSET + PLT_ALIGN);
}

#[test]
fn test_got_holds_relocation_offsets() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    let got = image.got();
    assert_eq!(got.len(), 2);
    assert_eq!(got["puts"], 0x600650);
    assert_eq!(got["exit"], 0x600658);
}

#[test]
fn test_symbols_merge_plt_and_symbol_tables() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    let symbols = image.symbols();
    assert_eq!(symbols["main"], 0x400500);
    assert_eq!(symbols["needle"], 0x600610);
    // Undefined dynamic symbols have value 0, so the PLT seed survives.
    assert_eq!(symbols["puts"], image.plt()["puts"]);
    assert_eq!(symbols["exit"], image.plt()["exit"]);
    assert!(!symbols.contains_key(""));
    assert_eq!(symbols.len(), 4);
}

#[test]
fn test_static_image_has_empty_plt_and_got() {
    let file = ElfBuilder::statically_linked().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    assert!(image.plt().is_empty());
    assert!(image.got().is_empty());
    assert_eq!(image.symbols()["main"], 0x400500);
    assert_eq!(image.symbols().len(), 2);
}

#[test]
fn test_catalog_keeps_relocation_entries() {
    let image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    let catalog = image.catalog();
    let plt = catalog.section_by_name(".plt").unwrap();
    let table = catalog.relocations_for(plt.index).unwrap();
    assert_eq!(table.entries.len(), 2);
    assert_eq!(table.entries[0].offset, 0x600650);
    assert_eq!(table.entries[0].symbol, Some(1));
    assert_eq!(table.entries[1].symbol, Some(2));
}
