//! Wire codec: byte-level encoding of requests and decoding of responses
//!
//! Every payload crossing the engine boundary is one of a small set of
//! schemas built from three primitives: little-endian u32 length/count
//! fields (4-byte aligned), UTF-16 code units, and raw classification
//! bytes. Requests are written into host-allocated regions of the engine
//! arena; responses are decoded from engine-owned regions in a single pass
//! that copies everything into host-native values, because the engine is
//! free to reuse its output region on the next call.
//!
//! # Response schemas
//!
//! ```text
//! string        {u32 len, len x u16}
//! suggestion    {u32 title_len, u32 desc_len, title_len x u16, desc_len x u16}
//! suggestions   {u32 count, count x suggestion}
//! error reasons {u32 count, count x {u32 start, u32 end, u32 msg_len, msg_len x u16}}
//! edit          {u32 cursor_position, u32 new_text_len, new_text_len x u16}
//! tokens        {u32 count, count x u8}
//! ```
//!
//! Address `0` always means "absent / empty" and is never dereferenced.

use crate::abi::{Addr, NULL_ADDR};
use crate::arena::{MemView, MemViewMut, Reader};
use crate::error::{BindingError, Result};
use crate::types::{EditResult, ErrorReason, Suggestion, SyntaxTokenKind};

// ============================================================================
// REQUEST ENCODING
// ============================================================================

/// Arena size in bytes for a nul-terminated UTF-16 text buffer
///
/// `units` is the code-unit count of the text; the buffer carries one extra
/// terminating zero unit. Text that cannot fit 32-bit arena addressing is
/// an allocation failure, not a wrapped size.
#[inline]
pub fn text_buffer_size(units: usize) -> Result<u32> {
    u32::try_from(units)
        .ok()
        .and_then(|u| u.checked_add(1))
        .and_then(|u| u.checked_mul(2))
        .ok_or_else(|| {
            BindingError::Allocation(format!(
                "text of {} code units exceeds 32-bit arena addressing",
                units
            ))
        })
}

/// Write `units` as nul-terminated UTF-16 at `addr`
///
/// The destination must have been allocated with
/// [`text_buffer_size`]`(units.len())` bytes.
pub fn encode_text(mem: &mut MemViewMut<'_>, addr: Addr, units: &[u16]) -> Result<()> {
    let mut offset = addr;
    for &unit in units {
        mem.write_u16(offset, unit)?;
        offset += 2;
    }
    mem.write_u16(offset, 0)
}

// ============================================================================
// RESPONSE DECODING
// ============================================================================

/// Decode a length-prefixed UTF-16 string response; `0` = absent
pub fn decode_string(mem: MemView<'_>, addr: Addr) -> Result<Option<String>> {
    if addr == NULL_ADDR {
        return Ok(None);
    }
    let mut r = Reader::new(mem, addr);
    Ok(Some(r.utf16_string()?))
}

/// Decode one suggestion record at the cursor
///
/// Both lengths precede both strings: the title units start right after the
/// description length, and the description units follow the title with no
/// padding between them.
fn suggestion_record(r: &mut Reader<'_>, id: u32) -> Result<Suggestion> {
    let title_len = r.u32()?;
    let desc_len = r.u32()?;
    let claimed = title_len.saturating_add(desc_len).saturating_mul(2);
    if claimed > r.remaining() {
        return Err(BindingError::OutOfBounds(format!(
            "suggestion record claims {} bytes of text with {} remaining",
            claimed,
            r.remaining()
        )));
    }
    let mut units = Vec::with_capacity(title_len as usize);
    for _ in 0..title_len {
        units.push(r.u16()?);
    }
    let title = String::from_utf16(&units)?;
    units.clear();
    units.reserve(desc_len as usize);
    for _ in 0..desc_len {
        units.push(r.u16()?);
    }
    let description = String::from_utf16(&units)?;
    Ok(Suggestion {
        id,
        title,
        description,
    })
}

/// Decode a single suggestion response; `0` = absent
///
/// `id` is the index the suggestion was requested with; the record itself
/// does not carry it.
pub fn decode_suggestion(mem: MemView<'_>, addr: Addr, id: u32) -> Result<Option<Suggestion>> {
    if addr == NULL_ADDR {
        return Ok(None);
    }
    let mut r = Reader::new(mem, addr);
    Ok(Some(suggestion_record(&mut r, id)?))
}

/// Decode the full suggestion list; `0` = empty
pub fn decode_suggestions(mem: MemView<'_>, addr: Addr) -> Result<Vec<Suggestion>> {
    if addr == NULL_ADDR {
        return Ok(Vec::new());
    }
    let mut r = Reader::new(mem, addr);
    let count = r.u32()?;
    // Each record is at least two length fields
    if count.saturating_mul(8) > r.remaining() {
        return Err(BindingError::OutOfBounds(format!(
            "suggestion list claims {} records with {} bytes remaining",
            count,
            r.remaining()
        )));
    }
    let mut suggestions = Vec::with_capacity(count as usize);
    for id in 0..count {
        // An odd-length description leaves the cursor misaligned; the next
        // record's length field re-aligns through the reader.
        suggestions.push(suggestion_record(&mut r, id)?);
    }
    Ok(suggestions)
}

/// Decode the diagnostic list; `0` = empty
pub fn decode_error_reasons(mem: MemView<'_>, addr: Addr) -> Result<Vec<ErrorReason>> {
    if addr == NULL_ADDR {
        return Ok(Vec::new());
    }
    let mut r = Reader::new(mem, addr);
    let count = r.u32()?;
    // Each record is at least three u32 fields
    if count.saturating_mul(12) > r.remaining() {
        return Err(BindingError::OutOfBounds(format!(
            "diagnostic list claims {} records with {} bytes remaining",
            count,
            r.remaining()
        )));
    }
    let mut reasons = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let start = r.u32()?;
        let end = r.u32()?;
        let message = r.utf16_string()?;
        reasons.push(ErrorReason {
            start,
            end,
            message,
        });
    }
    Ok(reasons)
}

/// Decode an edit response; `0` = no edit produced
pub fn decode_edit(mem: MemView<'_>, addr: Addr) -> Result<Option<EditResult>> {
    if addr == NULL_ADDR {
        return Ok(None);
    }
    let mut r = Reader::new(mem, addr);
    let cursor_position = r.u32()?;
    let new_text = r.utf16_string()?;
    Ok(Some(EditResult {
        cursor_position,
        new_text,
    }))
}

/// Decode the syntax classification array; `0` = absent
pub fn decode_syntax_tokens(mem: MemView<'_>, addr: Addr) -> Result<Option<Vec<SyntaxTokenKind>>> {
    if addr == NULL_ADDR {
        return Ok(None);
    }
    let mut r = Reader::new(mem, addr);
    let count = r.u32()?;
    if count > r.remaining() {
        return Err(BindingError::OutOfBounds(format!(
            "classification array claims {} bytes with {} remaining",
            count,
            r.remaining()
        )));
    }
    let mut tokens = Vec::with_capacity(count as usize);
    for i in 0..count {
        let byte = r.u8()?;
        let kind = SyntaxTokenKind::from_u8(byte).ok_or_else(|| {
            BindingError::Decode(format!(
                "unknown syntax classification byte {} at position {}",
                byte, i
            ))
        })?;
        tokens.push(kind);
    }
    Ok(Some(tokens))
}
