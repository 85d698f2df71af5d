//! Decoding through `object::read::elf` into owned catalog records.

use object::elf;
use object::read::elf::{FileHeader, ProgramHeader, Rela, SectionHeader, Sym};
use object::read::FileKind;
use object::Endianness;
use tracing::{debug, warn};

use super::{ElfHeader, StructureCatalog};
use crate::core::{
    ElfClass, ImageType, Perms, RelocationEntry, RelocationTable, Section, Segment, Symbol,
    SymbolTable,
};
use crate::error::{ElfError, Result};

/// Decode every structure the model needs from `data`.
///
/// Accepts ELF32 and ELF64 in either byte order. Anything else is
/// `ElfError::InvalidFormat`; malformed tables surface as `ElfError::Parse`.
pub fn decode(data: &[u8]) -> Result<StructureCatalog> {
    match FileKind::parse(data)? {
        FileKind::Elf32 => decode_file::<elf::FileHeader32<Endianness>>(data, ElfClass::Elf32),
        FileKind::Elf64 => decode_file::<elf::FileHeader64<Endianness>>(data, ElfClass::Elf64),
        other => Err(ElfError::InvalidFormat(format!(
            "expected an ELF image, found {:?}",
            other
        ))),
    }
}

fn decode_file<Elf>(data: &[u8], class: ElfClass) -> Result<StructureCatalog>
where
    Elf: FileHeader<Endian = Endianness>,
{
    let header = Elf::parse(data)?;
    let endian = header.endian()?;
    let is_mips64el = header.is_mips64el(endian);

    let mut segments = Vec::new();
    for (index, ph) in header.program_headers(endian, data)?.iter().enumerate() {
        segments.push(segment_from::<Elf>(index, endian, ph)?);
    }

    let table = header.sections(endian, data)?;
    let mut sections = Vec::with_capacity(table.len());
    let mut symbol_tables = Vec::new();
    let mut relocations = Vec::new();

    for (index, sh) in table.enumerate() {
        let name = String::from_utf8_lossy(table.section_name(endian, sh)?).into_owned();
        let section = Section {
            index: index.0,
            name,
            kind: sh.sh_type(endian),
            flags: sh.sh_flags(endian).into(),
            addr: sh.sh_addr(endian).into(),
            offset: sh.sh_offset(endian).into(),
            size: sh.sh_size(endian).into(),
            link: sh.sh_link(endian),
            info: sh.sh_info(endian),
            addralign: sh.sh_addralign(endian).into(),
            entsize: sh.sh_entsize(endian).into(),
        };

        if section.is_symbol_table() {
            let symtab = table.symbol_table_by_index(endian, data, index)?;
            let mut symbols = Vec::with_capacity(symtab.len());
            for (sym_index, sym) in symtab.enumerate() {
                let name = String::from_utf8_lossy(symtab.symbol_name(endian, sym)?).into_owned();
                let defining = symtab
                    .symbol_section(endian, sym, sym_index)?
                    .map(|s| s.0);
                symbols.push(Symbol {
                    name,
                    value: sym.st_value(endian).into(),
                    size: sym.st_size(endian).into(),
                    section: defining,
                });
            }
            symbol_tables.push(SymbolTable {
                section: index.0,
                symbols,
            });
        }

        let entries = if !section.is_relocation() {
            None
        } else if let Some((rels, link)) = sh.rel(endian, data)? {
            Some((relocation_entries::<Elf, _>(endian, is_mips64el, rels), link))
        } else if let Some((relas, link)) = sh.rela(endian, data)? {
            Some((relocation_entries::<Elf, _>(endian, is_mips64el, relas), link))
        } else {
            None
        };
        if let Some((entries, link)) = entries {
            relocations.push(RelocationTable {
                section: index.0,
                symbol_table: link.0,
                target: section.info as usize,
                entries,
            });
        }

        sections.push(section);
    }

    let elf_header = ElfHeader {
        class,
        endianness: endian.into(),
        image_type: ImageType::from_e_type(header.e_type(endian)),
        machine: header.e_machine(endian),
        entry: header.e_entry(endian).into(),
    };

    debug!(
        class = %elf_header.class,
        image_type = %elf_header.image_type,
        segments = segments.len(),
        sections = sections.len(),
        symbol_tables = symbol_tables.len(),
        relocation_sections = relocations.len(),
        "Decoded ELF structures"
    );

    Ok(StructureCatalog {
        header: elf_header,
        segments,
        sections,
        symbol_tables,
        relocations,
    })
}

fn segment_from<Elf>(index: usize, endian: Endianness, ph: &Elf::ProgramHeader) -> Result<Segment>
where
    Elf: FileHeader<Endian = Endianness>,
{
    let segment = Segment {
        index,
        kind: ph.p_type(endian),
        offset: ph.p_offset(endian).into(),
        file_size: ph.p_filesz(endian).into(),
        vaddr: ph.p_vaddr(endian).into(),
        mem_size: ph.p_memsz(endian).into(),
        align: ph.p_align(endian).into(),
        perms: Perms::from_p_flags(ph.p_flags(endian)),
    };

    if segment.file_size > segment.mem_size {
        warn!(
            index,
            file_size = segment.file_size,
            mem_size = segment.mem_size,
            "Segment file size exceeds memory size"
        );
        return Err(ElfError::InvalidFormat(format!(
            "segment {} has p_filesz {:#x} > p_memsz {:#x}",
            index, segment.file_size, segment.mem_size
        )));
    }
    if segment.offset.checked_add(segment.file_size).is_none()
        || segment.vaddr.checked_add(segment.mem_size).is_none()
    {
        return Err(ElfError::InvalidFormat(format!(
            "segment {} range wraps the address space",
            index
        )));
    }
    Ok(segment)
}

fn relocation_entries<Elf, Rel>(
    endian: Endianness,
    is_mips64el: bool,
    rels: &[Rel],
) -> Vec<RelocationEntry>
where
    Elf: FileHeader<Endian = Endianness>,
    Rel: Copy + Into<Elf::Rela>,
{
    rels.iter()
        .map(|rel| {
            let rel: Elf::Rela = (*rel).into();
            RelocationEntry {
                offset: rel.r_offset(endian).into(),
                symbol: rel.symbol(endian, is_mips64el).map(|s| s.0),
            }
        })
        .collect()
}
