use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::common::ElfBuilder;
use elfspace::{parse_trace, ElfError, ElfImage, Libraries, LibraryResolver};

struct FixedResolver {
    calls: Cell<usize>,
    seen: std::cell::RefCell<Option<PathBuf>>,
}

impl LibraryResolver for FixedResolver {
    fn resolve(&self, path: &Path) -> elfspace::Result<Libraries> {
        self.calls.set(self.calls.get() + 1);
        *self.seen.borrow_mut() = Some(path.to_path_buf());
        Ok(parse_trace(
            "\tlibc.so.6 => /lib/x86_64-linux-gnu/libc.so.6 (0x00007f1234560000)\n\
             \t/lib64/ld-linux-x86-64.so.2 (0x00007f1234800000)\n",
        ))
    }
}

#[test]
fn test_libraries_empty_until_resolved() {
    let file = ElfBuilder::default().write_temp();
    let image = ElfImage::open(file.path()).unwrap();
    assert!(image.libraries().is_empty());
}

#[test]
fn test_injected_resolver_receives_image_path() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();
    let resolver = FixedResolver {
        calls: Cell::new(0),
        seen: Default::default(),
    };

    let libs = image.resolve_libraries(&resolver).unwrap();
    assert_eq!(libs["/lib/x86_64-linux-gnu/libc.so.6"], 0x7f1234560000);
    assert_eq!(libs["/lib64/ld-linux-x86-64.so.2"], 0x7f1234800000);

    assert_eq!(resolver.calls.get(), 1);
    assert_eq!(resolver.seen.borrow().as_deref(), image.path());
    assert_eq!(image.libraries().len(), 2);
}

#[test]
fn test_closure_resolver() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();
    let resolver = |_: &Path| -> elfspace::Result<Libraries> {
        Ok(Libraries::from([("/lib/libfoo.so".to_string(), 0x1000)]))
    };
    image.resolve_libraries(&resolver).unwrap();
    assert_eq!(image.libraries()["/lib/libfoo.so"], 0x1000);
}

#[test]
fn test_resolver_failure_keeps_previous_libraries() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();
    let ok = |_: &Path| -> elfspace::Result<Libraries> {
        Ok(Libraries::from([("/lib/libc.so.6".to_string(), 0x2000)]))
    };
    let failing =
        |_: &Path| -> elfspace::Result<Libraries> { Err(ElfError::Subprocess("exit 1".into())) };

    image.resolve_libraries(&ok).unwrap();
    let err = image.resolve_libraries(&failing).unwrap_err();
    assert!(err.is_subprocess_failure());
    assert_eq!(image.libraries()["/lib/libc.so.6"], 0x2000);
}

#[test]
fn test_libraries_do_not_move_on_rebase() {
    let file = ElfBuilder::default().write_temp();
    let mut image = ElfImage::open(file.path()).unwrap();
    let resolver = |_: &Path| -> elfspace::Result<Libraries> {
        Ok(Libraries::from([("/lib/libc.so.6".to_string(), 0x7f0000000000)]))
    };
    image.resolve_libraries(&resolver).unwrap();
    image.set_base_address(0x900000);
    assert_eq!(image.libraries()["/lib/libc.so.6"], 0x7f0000000000);
}

#[test]
fn test_in_memory_image_cannot_resolve() {
    let mut image = ElfImage::from_bytes(ElfBuilder::default().build()).unwrap();
    let resolver = |_: &Path| -> elfspace::Result<Libraries> { Ok(Libraries::new()) };
    let err = image.resolve_libraries(&resolver).unwrap_err();
    assert!(matches!(err, ElfError::Subprocess(_)));
}
