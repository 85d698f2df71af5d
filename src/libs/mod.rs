//! Shared-library base addresses.
//!
//! The address-space model never spawns processes itself. It calls a
//! [`LibraryResolver`], so the trace can come from a local dynamic linker
//! ([`LddResolver`]), a remote target, or a fixed table in tests. Any
//! `Fn(&Path) -> Result<Libraries>` is a resolver too.

pub mod ldd;

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::Result;

pub use ldd::LddResolver;

/// Library path → base load address.
pub type Libraries = BTreeMap<String, u64>;

/// `<path> (<hex address>)`, with the path containing a slash.
static TRACE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(\S?/\S+)\s+\((0x[0-9a-fA-F]+)\)").expect("valid trace line regex")
});

/// Produces the shared libraries an image loads and where they are mapped.
pub trait LibraryResolver {
    fn resolve(&self, path: &Path) -> Result<Libraries>;
}

impl<F> LibraryResolver for F
where
    F: Fn(&Path) -> Result<Libraries>,
{
    fn resolve(&self, path: &Path) -> Result<Libraries> {
        self(path)
    }
}

/// Parse ldd-style trace output.
///
/// Lines that do not match (vdso entries without a path, blank lines,
/// "statically linked") are skipped. A later line for the same path wins.
pub fn parse_trace(output: &str) -> Libraries {
    let mut libs = Libraries::new();
    for line in output.lines() {
        let Some(caps) = TRACE_LINE.captures(line) else {
            continue;
        };
        let path = &caps[1];
        let digits = caps[2].trim_start_matches("0x");
        if let Ok(base) = u64::from_str_radix(digits, 16) {
            trace!(library = path, base, "Parsed trace line");
            libs.insert(path.to_string(), base);
        }
    }
    libs
}
