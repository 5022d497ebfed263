//! Typed field codecs built on the subrecord framing layer
//!
//! Decoders take an already framed [`Subrecord`]; the caller decides which
//! tag it is looking at. Encoders write a complete subrecord.

use crate::constants::{LengthWidth, MAX_TEXT_PAYLOAD};
use crate::cursor::Writer;
use crate::error::CodecError;
use crate::subrecord::{subrecord_size, write_subrecord, Subrecord};
use crate::types::Tag;
use crate::Result;
use alloc::string::{String, ToString};

/// Fail unless the payload is exactly `expected` bytes long
pub fn expect_len(sub: &Subrecord, expected: usize) -> Result<()> {
    if sub.len() != expected {
        return Err(CodecError::InvalidLength {
            tag: sub.tag,
            got: sub.len(),
            expected,
        });
    }
    Ok(())
}

/// Fixed-size opaque block
pub fn read_array<const N: usize>(sub: &Subrecord) -> Result<[u8; N]> {
    expect_len(sub, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&sub.payload);
    Ok(out)
}

/// One-byte scalar
pub fn read_u8(sub: &Subrecord) -> Result<u8> {
    read_array::<1>(sub).map(|b| b[0])
}

/// Two-byte little-endian scalar
pub fn read_u16(sub: &Subrecord) -> Result<u16> {
    read_array::<2>(sub).map(u16::from_le_bytes)
}

/// Four-byte little-endian scalar
pub fn read_u32(sub: &Subrecord) -> Result<u32> {
    read_array::<4>(sub).map(u32::from_le_bytes)
}

/// Eight-byte little-endian scalar
pub fn read_u64(sub: &Subrecord) -> Result<u64> {
    read_array::<8>(sub).map(u64::from_le_bytes)
}

/// Four-byte scalar whose zero value is invalid on the wire
pub fn read_nonzero_u32(sub: &Subrecord) -> Result<u32> {
    let value = read_u32(sub)?;
    if value == 0 {
        return Err(CodecError::ZeroValueViolation(sub.tag));
    }
    Ok(value)
}

/// Zero-length marker
pub fn read_marker(sub: &Subrecord) -> Result<()> {
    expect_len(sub, 0)
}

fn check_cap(sub: &Subrecord) -> Result<()> {
    if sub.len() > MAX_TEXT_PAYLOAD {
        return Err(CodecError::LengthOverCap {
            tag: sub.tag,
            got: sub.len(),
            cap: MAX_TEXT_PAYLOAD,
        });
    }
    Ok(())
}

fn text_until_nul(sub: &Subrecord) -> Result<String> {
    let bytes = &sub.payload[..];
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..end])
        .map(|s| s.to_string())
        .map_err(|_| CodecError::InvalidText(sub.tag))
}

/// Capped NUL-terminated text
///
/// The content ends at the first NUL; anything after it is dropped.
pub fn read_text(sub: &Subrecord) -> Result<String> {
    check_cap(sub)?;
    text_until_nul(sub)
}

/// Capped NUL-terminated text that must not be empty
pub fn read_nonempty_text(sub: &Subrecord) -> Result<String> {
    let text = read_text(sub)?;
    if text.is_empty() {
        return Err(CodecError::EmptyText(sub.tag));
    }
    Ok(text)
}

/// Capped text stored without a NUL terminator
pub fn read_raw_text(sub: &Subrecord) -> Result<String> {
    read_nonempty_text(sub)
}

/// Store `value` into a singular slot, rejecting a second occurrence
pub fn set_once<T>(slot: &mut Option<T>, tag: Tag, value: T) -> Result<()> {
    if slot.is_some() {
        return Err(CodecError::DuplicateSubrecord(tag));
    }
    *slot = Some(value);
    Ok(())
}

/// Write a two-byte scalar subrecord
pub fn write_u16(writer: &mut Writer, tag: Tag, value: u16) -> Result<()> {
    write_subrecord(writer, tag, &value.to_le_bytes())
}

/// Write a four-byte scalar subrecord
pub fn write_u32(writer: &mut Writer, tag: Tag, value: u32) -> Result<()> {
    write_subrecord(writer, tag, &value.to_le_bytes())
}

/// Write an eight-byte scalar subrecord
pub fn write_u64(writer: &mut Writer, tag: Tag, value: u64) -> Result<()> {
    write_subrecord(writer, tag, &value.to_le_bytes())
}

/// Write a zero-length marker
pub fn write_marker(writer: &mut Writer, tag: Tag) -> Result<()> {
    write_subrecord(writer, tag, &[])
}

/// Write NUL-terminated text
pub fn write_text(writer: &mut Writer, tag: Tag, text: &str) -> Result<()> {
    writer.put_tag(tag);
    writer.put_length(tag, text.len() + 1)?;
    writer.put_slice(text.as_bytes());
    writer.put_u8(0);
    Ok(())
}

/// Write NUL-terminated text that must not be empty
pub fn write_nonempty_text(writer: &mut Writer, tag: Tag, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(CodecError::EmptyText(tag));
    }
    write_text(writer, tag, text)
}

/// Write text without a terminator; empty text has no wire form
pub fn write_raw_text(writer: &mut Writer, tag: Tag, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(CodecError::EmptyText(tag));
    }
    write_subrecord(writer, tag, text.as_bytes())
}

/// Size of a four-byte scalar subrecord
pub const fn u32_size(width: LengthWidth) -> u32 {
    subrecord_size(width, 4)
}

/// Size of a NUL-terminated text subrecord
pub fn text_size(width: LengthWidth, text: &str) -> u32 {
    subrecord_size(width, text.len() + 1)
}

/// Size of an unterminated text subrecord
pub fn raw_text_size(width: LengthWidth, text: &str) -> u32 {
    subrecord_size(width, text.len())
}
