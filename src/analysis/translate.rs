//! File offset ↔ virtual address translation and pattern search.
//!
//! Translation walks the program headers in table order and takes the first
//! segment whose (closed) range contains the input. Overlapping segments are
//! not validated; order decides.

use memchr::memmem;

use crate::core::Segment;

/// Translates between file offsets and virtual addresses over a segment list.
#[derive(Debug, Clone, Copy)]
pub struct AddressTranslator<'a> {
    segments: &'a [Segment],
}

impl<'a> AddressTranslator<'a> {
    pub fn new(segments: &'a [Segment]) -> Self {
        Self { segments }
    }

    /// Virtual address of a file offset, or `None` if no segment maps it.
    pub fn offset_to_address(&self, offset: u64) -> Option<u64> {
        self.segments
            .iter()
            .find(|s| s.contains_offset(offset))
            .map(|s| s.vaddr.wrapping_add(offset - s.offset))
    }

    /// File offset of a virtual address, or `None` if no segment maps it.
    pub fn address_to_offset(&self, address: u64) -> Option<u64> {
        self.segments
            .iter()
            .find(|s| s.contains_address(address))
            .map(|s| s.offset.wrapping_add(address - s.vaddr))
    }

    /// Every occurrence of `pattern` in segment contents.
    ///
    /// Only writable segments are scanned unless `include_non_writable` is
    /// set. Matches may overlap. Addresses come out in segment order, then in
    /// ascending order within a segment. The returned iterator is lazy; call
    /// `search` again to start over.
    pub fn search<'p>(
        &self,
        data: &'a [u8],
        pattern: &'p [u8],
        include_non_writable: bool,
    ) -> Search<'a, 'p> {
        Search {
            segments: self.segments.iter(),
            data,
            finder: memmem::Finder::new(pattern),
            include_non_writable,
            current: None,
        }
    }
}

/// File bytes backing a segment, clipped to the end of `data`.
pub fn segment_data<'d>(segment: &Segment, data: &'d [u8]) -> &'d [u8] {
    let start = usize::try_from(segment.offset).unwrap_or(usize::MAX);
    if start >= data.len() {
        return &[];
    }
    let len = usize::try_from(segment.file_size).unwrap_or(usize::MAX);
    let end = start.saturating_add(len).min(data.len());
    &data[start..end]
}

struct Cursor<'a> {
    vaddr: u64,
    bytes: &'a [u8],
    next: usize,
}

/// Lazy iterator returned by [`AddressTranslator::search`].
pub struct Search<'a, 'p> {
    segments: std::slice::Iter<'a, Segment>,
    data: &'a [u8],
    finder: memmem::Finder<'p>,
    include_non_writable: bool,
    current: Option<Cursor<'a>>,
}

impl Iterator for Search<'_, '_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.finder.needle().is_empty() {
            return None;
        }
        loop {
            if let Some(cursor) = self.current.as_mut() {
                if cursor.next < cursor.bytes.len() {
                    if let Some(found) = self.finder.find(&cursor.bytes[cursor.next..]) {
                        let at = cursor.next + found;
                        cursor.next = at + 1;
                        return Some(cursor.vaddr.wrapping_add(at as u64));
                    }
                }
                self.current = None;
            }

            let segment = self.segments.next()?;
            if !self.include_non_writable && !segment.is_writable() {
                continue;
            }
            self.current = Some(Cursor {
                vaddr: segment.vaddr,
                bytes: segment_data(segment, self.data),
                next: 0,
            });
        }
    }
}
