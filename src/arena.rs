//! Typed, bounds-checked views over the engine's linear memory
//!
//! Everything crossing the engine boundary is read or written through this
//! module. The raw memory region is only ever touched as 8/16/32-bit
//! little-endian values at checked offsets; no caller does its own byte
//! indexing, which keeps off-by-one and misalignment bugs in one place.
//!
//! The wire format packs every 32-bit field on a 4-byte boundary. UTF-16
//! payloads of odd code-unit length leave the cursor 2 bytes short of that
//! boundary, so [`Reader`] re-aligns with [`align4`] before every 32-bit
//! read rather than trusting call sites to remember.

use crate::error::{BindingError, Result};

/// Round `offset` up to the next multiple of 4
///
/// Standard ceiling alignment: already-aligned offsets are unchanged,
/// everything else moves forward (5 -> 8, 6 -> 8, 7 -> 8).
#[inline(always)]
pub const fn align4(offset: u32) -> u32 {
    (offset + 3) & !3
}

fn oob(what: &str, offset: u32, need: u32, size: usize) -> BindingError {
    BindingError::OutOfBounds(format!(
        "{} of {} bytes at offset {} exceeds linear memory of {} bytes",
        what, need, offset, size
    ))
}

/// Read-only typed view of a linear memory region
#[derive(Clone, Copy)]
pub struct MemView<'a> {
    bytes: &'a [u8],
}

impl<'a> MemView<'a> {
    /// Wrap a memory region
    pub fn new(bytes: &'a [u8]) -> Self {
        MemView { bytes }
    }

    /// Size of the region in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the region is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read one byte at `offset`
    pub fn read_u8(&self, offset: u32) -> Result<u8> {
        self.bytes
            .get(offset as usize)
            .copied()
            .ok_or_else(|| oob("read", offset, 1, self.bytes.len()))
    }

    /// Read a little-endian u16 at `offset`
    pub fn read_u16(&self, offset: u32) -> Result<u16> {
        let start = offset as usize;
        match self.bytes.get(start..start + 2) {
            Some(b) => Ok(u16::from_le_bytes([b[0], b[1]])),
            None => Err(oob("read", offset, 2, self.bytes.len())),
        }
    }

    /// Read a little-endian u32 at `offset`
    pub fn read_u32(&self, offset: u32) -> Result<u32> {
        let start = offset as usize;
        match self.bytes.get(start..start + 4) {
            Some(b) => Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            None => Err(oob("read", offset, 4, self.bytes.len())),
        }
    }
}

/// Mutable typed view of a linear memory region
pub struct MemViewMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MemViewMut<'a> {
    /// Wrap a memory region
    pub fn new(bytes: &'a mut [u8]) -> Self {
        MemViewMut { bytes }
    }

    /// Write one byte at `offset`
    pub fn write_u8(&mut self, offset: u32, value: u8) -> Result<()> {
        let len = self.bytes.len();
        match self.bytes.get_mut(offset as usize) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(oob("write", offset, 1, len)),
        }
    }

    /// Write a little-endian u16 at `offset`
    pub fn write_u16(&mut self, offset: u32, value: u16) -> Result<()> {
        let len = self.bytes.len();
        let start = offset as usize;
        match self.bytes.get_mut(start..start + 2) {
            Some(b) => {
                b.copy_from_slice(&value.to_le_bytes());
                Ok(())
            }
            None => Err(oob("write", offset, 2, len)),
        }
    }

    /// Write a little-endian u32 at `offset`
    pub fn write_u32(&mut self, offset: u32, value: u32) -> Result<()> {
        let len = self.bytes.len();
        let start = offset as usize;
        match self.bytes.get_mut(start..start + 4) {
            Some(b) => {
                b.copy_from_slice(&value.to_le_bytes());
                Ok(())
            }
            None => Err(oob("write", offset, 4, len)),
        }
    }

    /// Copy raw bytes into the region starting at `offset`
    pub fn write_bytes(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        let len = self.bytes.len();
        let start = offset as usize;
        match self.bytes.get_mut(start..start + data.len()) {
            Some(b) => {
                b.copy_from_slice(data);
                Ok(())
            }
            None => Err(oob("write", offset, data.len() as u32, len)),
        }
    }
}

/// Sequential decode cursor over a [`MemView`]
///
/// The cursor owns the alignment discipline: every 32-bit read first rounds
/// the offset up to a 4-byte boundary, 16-bit and 8-bit reads advance
/// without padding. Message decoders declare field order and nothing else.
pub struct Reader<'a> {
    view: MemView<'a>,
    offset: u32,
}

impl<'a> Reader<'a> {
    /// Start a cursor at `addr`
    pub fn new(view: MemView<'a>, addr: u32) -> Self {
        Reader { view, offset: addr }
    }

    /// Current byte offset
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Bytes left between the cursor and the end of memory
    ///
    /// Length and count prefixes are validated against this before any
    /// storage is reserved for them, so a corrupted prefix fails fast
    /// instead of asking for gigabytes.
    pub fn remaining(&self) -> u32 {
        (self.view.len() as u32).saturating_sub(self.offset)
    }

    /// Read a u32 field, re-aligning to 4 bytes first
    pub fn u32(&mut self) -> Result<u32> {
        self.offset = align4(self.offset);
        let value = self.view.read_u32(self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    /// Read one UTF-16 code unit
    pub fn u16(&mut self) -> Result<u16> {
        let value = self.view.read_u16(self.offset)?;
        self.offset += 2;
        Ok(value)
    }

    /// Read one classification byte
    pub fn u8(&mut self) -> Result<u8> {
        let value = self.view.read_u8(self.offset)?;
        self.offset += 1;
        Ok(value)
    }

    /// Read a length-prefixed UTF-16 string field
    ///
    /// Consumes a u32 code-unit count (aligned) followed by exactly that
    /// many 16-bit units with no terminator. The decoded text is copied into
    /// a host-owned `String`; unpaired surrogates are a decode error.
    pub fn utf16_string(&mut self) -> Result<String> {
        let len = self.u32()?;
        if len.saturating_mul(2) > self.remaining() {
            return Err(BindingError::OutOfBounds(format!(
                "string of {} code units at offset {} exceeds remaining {} bytes",
                len,
                self.offset,
                self.remaining()
            )));
        }
        let mut units = Vec::with_capacity(len as usize);
        for _ in 0..len {
            units.push(self.u16()?);
        }
        Ok(String::from_utf16(&units)?)
    }
}
