//! Core types shared by every record codec

use crate::constants::LengthWidth;
use crate::cursor::{Reader, Writer};
use crate::string_table::StringTable;
use crate::Result;
use core::fmt;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A four-character subrecord or record code such as `EDID`
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Create a tag from its raw bytes
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Raw bytes as they appear on the wire
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Interpret the tag as a little-endian integer
    pub const fn as_u32(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct TagVisitor;

impl<'de> Visitor<'de> for TagVisitor {
    type Value = Tag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a four character ASCII tag")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> core::result::Result<Tag, E> {
        let bytes: [u8; 4] = v
            .as_bytes()
            .try_into()
            .map_err(|_| E::invalid_length(v.len(), &self))?;
        Ok(Tag(bytes))
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Tag, D::Error> {
        deserializer.deserialize_str(TagVisitor)
    }
}

/// A fixed set of tags, reported by `UnexpectedTag` errors
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TagList(pub &'static [Tag]);

impl TagList {
    /// Check whether the list contains a tag
    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self)
    }
}

/// Decode-time settings handed to every record codec
///
/// `localized` comes from the file header's flags; `strings` is the
/// caller's table, only read, never modified.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Localized strings are stored as string table keys
    pub localized: bool,

    /// String table used to resolve localized keys
    pub strings: &'a StringTable,
}

impl<'a> DecodeContext<'a> {
    /// Create a new context
    pub fn new(localized: bool, strings: &'a StringTable) -> Self {
        Self { localized, strings }
    }

    /// Context for files that store their text inline
    pub fn inline(strings: &'a StringTable) -> Self {
        Self::new(false, strings)
    }
}

/// The uniform contract every concrete record type implements
///
/// `decode` consumes a record body (the bytes after the record header) from
/// `reader`; `encode` writes the same body. `encoded_size` must equal the
/// number of bytes `encode` writes for the same value.
pub trait RecordCodec: Sized + PartialEq {
    /// Record tag handled by this codec
    const TAG: Tag;

    /// Decode a record body
    fn decode(reader: &mut Reader, ctx: &DecodeContext<'_>) -> Result<Self>;

    /// Encode the record body
    fn encode(&self, writer: &mut Writer) -> Result<()>;

    /// Exact number of body bytes `encode` will write
    fn encoded_size(&self, width: LengthWidth) -> u32;

    /// Compare two decoded records field by field
    fn structural_equals(&self, other: &Self) -> bool {
        self == other
    }
}
