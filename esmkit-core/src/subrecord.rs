//! Subrecord framing: `tag(4) + length(2 or 4, LE) + payload(length)`

use crate::constants::LengthWidth;
use crate::cursor::{Reader, Writer};
use crate::error::CodecError;
use crate::types::{Tag, TagList};
use crate::Result;
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::trace;

/// One framed subrecord
///
/// Exists only while a field is being decoded; `payload` shares the
/// reader's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subrecord {
    /// Four-character code
    pub tag: Tag,

    /// Payload bytes
    pub payload: Bytes,
}

impl Subrecord {
    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True for zero-length markers
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Read one subrecord
///
/// Fails with `TruncatedStream` if the stream ends inside the header or
/// before `length` payload bytes are available.
pub fn read_subrecord(reader: &mut Reader) -> Result<Subrecord> {
    let tag = reader.read_tag()?;
    let len = reader.read_length()?;
    let payload = reader.take(len)?;

    #[cfg(feature = "logging")]
    trace!("Read subrecord {} ({} bytes)", tag, len);

    Ok(Subrecord { tag, payload })
}

/// Read one subrecord which must carry `tag`
pub fn read_expected(reader: &mut Reader, tag: Tag, allowed: TagList) -> Result<Subrecord> {
    let sub = read_subrecord(reader)?;
    if sub.tag != tag {
        return Err(CodecError::UnexpectedTag {
            found: sub.tag,
            allowed,
        });
    }
    Ok(sub)
}

/// Write one subrecord
pub fn write_subrecord(writer: &mut Writer, tag: Tag, payload: &[u8]) -> Result<()> {
    writer.put_tag(tag);
    writer.put_length(tag, payload.len())?;
    writer.put_slice(payload);
    Ok(())
}

/// On-wire size of a subrecord with `payload_len` payload bytes
///
/// Saturates at `u32::MAX`; such a subrecord cannot be written.
pub const fn subrecord_size(width: LengthWidth, payload_len: usize) -> u32 {
    let total = width.overhead().saturating_add(payload_len);
    if total > u32::MAX as usize {
        u32::MAX
    } else {
        total as u32
    }
}

/// Sum of on-wire sizes, saturating at `u32::MAX`
pub fn total_size(sizes: impl IntoIterator<Item = u32>) -> u32 {
    sizes.into_iter().fold(0, u32::saturating_add)
}

/// Size of `count` items of `each` bytes, saturating at `u32::MAX`
pub fn repeated_size(count: usize, each: u32) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |n| n.saturating_mul(each))
}
