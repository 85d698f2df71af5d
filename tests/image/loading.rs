use crate::common::layout::*;
use crate::common::{write_temp_file, ElfBuilder};
use elfspace::io::error::IoError;
use elfspace::{ElfClass, ElfError, ElfImage, Endianness, IOLimits, ImageType, LoadConfig};

#[test]
fn test_open_reports_header_facts() {
    elfspace::logging::init_tracing();
    let builder = ElfBuilder::default();
    let file = builder.write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    assert_eq!(image.elf_class(), ElfClass::Elf64);
    assert_eq!(image.elf_class().bits(), 64);
    assert_eq!(image.image_type(), ImageType::Executable);
    assert_eq!(image.image_type().short_name(), "EXEC");
    assert_eq!(image.machine(), 62);
    assert_eq!(image.catalog().header.entry, 0x400500);
    assert_eq!(elfspace::MemoryView::endianness(&image), Endianness::Little);
}

#[test]
fn test_path_is_absolute_and_canonical() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();
    let path = image.path().unwrap();
    assert!(path.is_absolute());
    assert_eq!(path, std::fs::canonicalize(file.path()).unwrap());
}

#[test]
fn test_segments_and_permissions() {
    let builder = ElfBuilder::default();
    let file = builder.write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    let segments = image.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].vaddr, 0x400000);
    assert_eq!(segments[0].perms.to_string(), "r-x");
    assert_eq!(segments[1].vaddr, 0x600600);
    assert_eq!(segments[1].file_size, DATA_FILE_SIZE);
    assert_eq!(segments[1].mem_size, DATA_MEM_SIZE);
    assert_eq!(segments[1].perms.to_string(), "rw-");

    let exec: Vec<_> = image.executable_segments().map(|s| s.index).collect();
    let writable: Vec<_> = image.writable_segments().map(|s| s.index).collect();
    assert_eq!(exec, vec![0]);
    assert_eq!(writable, vec![1]);
}

#[test]
fn test_sections_and_section_data() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    let names: Vec<&str> = image.sections().iter().map(|s| s.name.as_str()).collect();
    for expected in [".plt", ".text", ".data", ".got.plt", ".bss", ".rela.plt", ".dynsym", ".symtab"] {
        assert!(names.contains(&expected), "missing {expected} in {names:?}");
    }

    let text = image.section_data(".text").unwrap();
    assert_eq!(text.len() as u64, TEXT_SIZE);
    let main = (MAIN_OFFSET - TEXT_OFFSET) as usize;
    assert_eq!(&text[main..main + MAIN_PROLOGUE.len()], MAIN_PROLOGUE);

    assert_eq!(image.section_data(".bss"), Some(&[][..]));
    assert!(image.section_data(".nope").is_none());
}

#[test]
fn test_offset_address_round_trip() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();

    for address in [0x400000, 0x400500, 0x4005ff, 0x600601, 0x600650] {
        let offset = image.address_to_offset(address).unwrap();
        assert_eq!(image.offset_to_address(offset), Some(address));
    }
    assert_eq!(image.address_to_offset(0x400500), Some(MAIN_OFFSET));
    assert_eq!(image.offset_to_address(NEEDLE_OFFSET), Some(0x600610));

    // Gap between the two segments
    assert_eq!(image.address_to_offset(0x500000), None);
    // Past every segment's file range
    assert_eq!(image.offset_to_address(0x10_0000), None);
}

#[test]
fn test_from_bytes_has_no_path() {
    let image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    assert!(image.path().is_none());
    assert_eq!(image.base_address(), 0x400000);
}

#[test]
fn test_big_endian_image() {
    let image = ElfImage::from_bytes(ElfBuilder::big_endian().build()).unwrap();
    assert_eq!(elfspace::MemoryView::endianness(&image), Endianness::Big);
    assert_eq!(image.symbols()["main"], 0x400500);
    assert_eq!(image.plt()["exit"], 0x400110);
    assert_eq!(image.got()["exit"], 0x600658);
}

#[test]
fn test_position_independent_image() {
    let builder = ElfBuilder::position_independent();
    let image = ElfImage::from_bytes(builder.build()).unwrap();
    assert_eq!(image.image_type(), ImageType::SharedObject);
    assert_eq!(image.image_type().short_name(), "DYN");
    // The text segment sits at 0, so the data segment defines the base.
    assert_eq!(image.base_address(), builder.data_address(DATA_OFFSET));
}

#[test]
fn test_non_elf_file_is_rejected() {
    let file = write_temp_file(b"#!/bin/sh\necho not an elf\n");
    let err = ElfImage::open(file.path()).unwrap_err();
    assert!(matches!(err, ElfError::InvalidFormat(_) | ElfError::Parse(_)));
}

#[test]
fn test_truncated_image_is_rejected() {
    let bytes = ElfBuilder::default().build();
    let err = ElfImage::from_bytes(bytes[..40].to_vec()).unwrap_err();
    assert!(matches!(err, ElfError::InvalidFormat(_) | ElfError::Parse(_)));
}

#[test]
fn test_file_size_larger_than_memory_size_is_rejected() {
    let builder = ElfBuilder::default();
    let mut bytes = builder.build();
    // p_filesz of the second program header
    let at = builder.phdr_offset(1) as usize + 32;
    bytes[at..at + 8].copy_from_slice(&0x200u64.to_le_bytes());
    let err = ElfImage::from_bytes(bytes).unwrap_err();
    assert!(matches!(err, ElfError::InvalidFormat(_)));
}

#[test]
fn test_io_limits_are_enforced() {
    let file = ElfBuilder::default().write_temp();
    let config = LoadConfig {
        io: IOLimits { max_file_size: 128 },
        ..LoadConfig::default()
    };
    let err = ElfImage::open_with_config(file.path(), &config).unwrap_err();
    assert!(matches!(
        err,
        ElfError::Buffer(IoError::FileTooLarge { limit: 128, .. })
    ));
}
