use crate::common::layout::*;
use crate::common::ElfBuilder;
use elfspace::{ElfError, ElfImage, MemoryView};

#[test]
fn test_read_by_address() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    assert_eq!(image.read(0x400500, 4).unwrap(), MAIN_PROLOGUE);
    assert_eq!(image.read(0x600610, NEEDLE.len()).unwrap(), NEEDLE);
    assert_eq!(image.read(0x400000, 4).unwrap(), b"\x7fELF");
}

#[test]
fn test_reads_have_no_side_effects() {
    let image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    let first = image.read(0x400500, 4).unwrap();
    let _ = image.read(0x600610, 8).unwrap();
    assert_eq!(image.read(0x400500, 4).unwrap(), first);
}

#[test]
fn test_read_unmapped_address_fails() {
    let image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    let err = image.read(0x500000, 4).unwrap_err();
    assert!(matches!(err, ElfError::AddressNotMapped(0x500000)));
}

#[test]
fn test_write_then_read() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();

    image.write(0x400500, &[0xc3, 0x90, 0x90, 0x90]).unwrap();
    assert_eq!(image.read(0x400500, 4).unwrap(), vec![0xc3, 0x90, 0x90, 0x90]);

    image.write(0x600610, b"patched!").unwrap();
    assert_eq!(image.read(0x600610, 8).unwrap(), b"patched!");
}

#[test]
fn test_write_is_not_confined_to_a_segment() {
    let mut image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    // Starts at the last byte of the text segment and runs into the data segment.
    image.write(0x4005ff, &[0xaa, 0xbb]).unwrap();
    assert_eq!(image.read(0x4005ff, 1).unwrap(), vec![0xaa]);
    assert_eq!(image.read(0x600600, 1).unwrap(), vec![0xbb]);
}

#[test]
fn test_write_past_end_of_image_fails() {
    let bytes = ElfBuilder::default().build();
    let len = bytes.len() as u64;
    let mut image = ElfImage::from_bytes(bytes).unwrap();

    // .bss is mapped but has no file bytes; its offset continues into the
    // trailing tables, so a long enough write runs off the buffer.
    let bss = 0x600660;
    let err = image.write(bss, &vec![0u8; len as usize]).unwrap_err();
    assert!(matches!(err, ElfError::WriteOutOfBounds { .. }));
    assert!(image.symbols().contains_key("main"));
}

#[test]
fn test_writes_stay_in_memory() {
    let file = ElfBuilder::default().write_temp();
    let original = std::fs::read(file.path()).unwrap();
    {
        let mut image = ElfImage::open(file.path()).unwrap();
        image.write(0x400500, &[0xcc; 4]).unwrap();
    }
    assert_eq!(std::fs::read(file.path()).unwrap(), original);
}

#[test]
fn test_two_images_share_a_file_independently() {
    let file = ElfBuilder::default().write_temp();
    let mut first = ElfImage::open(file.path()).unwrap();
    let second = ElfImage::open(file.path()).unwrap();

    first.write(0x600610, b"XXXXXXXX").unwrap();
    assert_eq!(second.read(0x600610, 8).unwrap(), NEEDLE);
}

#[test]
fn test_save_persists_patches() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();
    image.write(0x600610, b"saved!!!").unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let out = dir.path().join("patched.elf");
    image.save(&out).unwrap();

    let reopened = ElfImage::open(&out).unwrap();
    assert_eq!(reopened.read(0x600610, 8).unwrap(), b"saved!!!");
    assert_eq!(reopened.symbols(), image.symbols());
}

#[test]
fn test_typed_access() {
    let mut image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    assert_eq!(image.read_u32(0x400000).unwrap(), u32::from_le_bytes(*b"\x7fELF"));
    assert_eq!(image.read_u64(0x600650).unwrap(), 0x400000 + PLT_OFFSET + 6);

    image.write_u64(0x600650, 0x7f00_dead_beef).unwrap();
    assert_eq!(image.read_u64(0x600650).unwrap(), 0x7f00_dead_beef);
}

#[test]
fn test_typed_access_big_endian() {
    let mut image = ElfImage::from_bytes(ElfBuilder::big_endian().build()).unwrap();
    assert_eq!(image.read_u16(0x400000 + 18).unwrap(), 62);
    image.write_u32(0x600610, 0x01020304).unwrap();
    assert_eq!(image.read(0x600610, 4).unwrap(), vec![1, 2, 3, 4]);
}
