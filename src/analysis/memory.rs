//! Raw reads and writes by virtual address.
//!
//! Addresses are translated to file offsets through the segment table and
//! the bytes are read from, or written to, the in-memory image buffer. There
//! is no cursor: a read never affects a later operation.
//!
//! Writes are not confined to the segment that maps their start
//! address. A long write can spill into whatever follows in the file; only
//! running off the end of the buffer is rejected.

use tracing::trace;

use super::translate::AddressTranslator;
use crate::core::Endianness;
use crate::error::{ElfError, Result};

/// Read up to `len` bytes at `address`.
///
/// The result is shorter than `len` only where the image buffer ends.
pub fn read_at(
    translator: &AddressTranslator<'_>,
    data: &[u8],
    address: u64,
    len: usize,
) -> Result<Vec<u8>> {
    let offset = translator
        .address_to_offset(address)
        .ok_or(ElfError::AddressNotMapped(address))?;
    let start = usize::try_from(offset).unwrap_or(usize::MAX);
    let bytes = match data.get(start..) {
        Some(tail) => &tail[..len.min(tail.len())],
        None => &[][..],
    };
    trace!(address, offset, requested = len, read = bytes.len(), "Read");
    Ok(bytes.to_vec())
}

/// Write `bytes` at `address`.
///
/// Fails without touching the buffer if the write would pass its end.
pub fn write_at(
    translator: &AddressTranslator<'_>,
    data: &mut [u8],
    address: u64,
    bytes: &[u8],
) -> Result<()> {
    let offset = translator
        .address_to_offset(address)
        .ok_or(ElfError::AddressNotMapped(address))?;
    let size = data.len() as u64;
    let out_of_bounds = || ElfError::WriteOutOfBounds {
        offset,
        len: bytes.len(),
        size,
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(bytes.len()).ok_or_else(out_of_bounds)?;
    if end > data.len() {
        return Err(out_of_bounds());
    }
    data[start..end].copy_from_slice(bytes);
    trace!(address, offset, len = bytes.len(), "Wrote");
    Ok(())
}

/// Virtual-address reads and writes over an image.
pub trait MemoryView {
    /// Read up to `len` bytes at `address`.
    fn read_bytes(&self, address: u64, len: usize) -> Result<Vec<u8>>;

    /// Overwrite bytes starting at `address`.
    fn write_bytes(&mut self, address: u64, data: &[u8]) -> Result<()>;

    /// Byte order used by the typed helpers.
    fn endianness(&self) -> Endianness;

    /// Read exactly `N` bytes.
    fn read_array<const N: usize>(&self, address: u64) -> Result<[u8; N]> {
        let bytes = self.read_bytes(address, N)?;
        bytes.as_slice().try_into().map_err(|_| ElfError::ShortRead {
            address,
            wanted: N,
            got: bytes.len(),
        })
    }

    fn read_u8(&self, address: u64) -> Result<u8> {
        Ok(self.read_array::<1>(address)?[0])
    }

    fn read_u16(&self, address: u64) -> Result<u16> {
        let b = self.read_array::<2>(address)?;
        Ok(match self.endianness() {
            Endianness::Little => u16::from_le_bytes(b),
            Endianness::Big => u16::from_be_bytes(b),
        })
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let b = self.read_array::<4>(address)?;
        Ok(match self.endianness() {
            Endianness::Little => u32::from_le_bytes(b),
            Endianness::Big => u32::from_be_bytes(b),
        })
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        let b = self.read_array::<8>(address)?;
        Ok(match self.endianness() {
            Endianness::Little => u64::from_le_bytes(b),
            Endianness::Big => u64::from_be_bytes(b),
        })
    }

    fn write_u32(&mut self, address: u64, value: u32) -> Result<()> {
        let bytes = match self.endianness() {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, &bytes)
    }

    fn write_u64(&mut self, address: u64, value: u64) -> Result<()> {
        let bytes = match self.endianness() {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        self.write_bytes(address, &bytes)
    }
}
