//! CTDA condition block paired with an optional attached CIS string

use crate::constants::{LengthWidth, CIS1, CIS2, CONDITION_SIZE, CTDA};
use crate::cursor::{Reader, Writer};
use crate::error::CodecError;
use crate::fields::{read_array, read_nonempty_text, text_size, write_nonempty_text};
use crate::subrecord::{
    read_expected, read_subrecord, subrecord_size, total_size, write_subrecord, Subrecord,
};
use crate::types::{Tag, TagList};
use crate::Result;
use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Which tag carries the attached string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringVariant {
    /// `CIS1`
    Cis1,
    /// `CIS2`
    Cis2,
}

impl StringVariant {
    /// Tag of the attached string subrecord
    pub const fn tag(&self) -> Tag {
        match self {
            StringVariant::Cis1 => CIS1,
            StringVariant::Cis2 => CIS2,
        }
    }
}

const CONDITION_TAGS: &[Tag] = &[CTDA];

/// A 32-byte condition plus an optional comparison string
///
/// When present, `attached` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCompound {
    /// Opaque condition block, preserved byte for byte
    pub condition: [u8; CONDITION_SIZE],

    /// Attached string, written after the block when present
    pub attached: Option<String>,
}

impl Default for ConditionCompound {
    fn default() -> Self {
        Self::new([0u8; CONDITION_SIZE])
    }
}

impl ConditionCompound {
    /// Compound without an attached string
    pub fn new(condition: [u8; CONDITION_SIZE]) -> Self {
        Self {
            condition,
            attached: None,
        }
    }

    /// Compound with an attached string
    pub fn with_string(condition: [u8; CONDITION_SIZE], attached: impl Into<String>) -> Self {
        Self {
            condition,
            attached: Some(attached.into()),
        }
    }

    /// Build from an already framed CTDA subrecord
    pub fn from_subrecord(sub: &Subrecord) -> Result<Self> {
        read_array::<CONDITION_SIZE>(sub).map(Self::new)
    }

    /// Attach a framed string subrecord, rejecting a second one
    pub fn attach(&mut self, sub: &Subrecord) -> Result<()> {
        if self.attached.is_some() {
            return Err(CodecError::DuplicateSubrecord(sub.tag));
        }
        self.attached = Some(read_nonempty_text(sub)?);
        Ok(())
    }

    /// Decode a CTDA and, if the very next subrecord is the variant's
    /// string tag, that string too
    pub fn decode(reader: &mut Reader, variant: StringVariant) -> Result<Self> {
        let sub = read_expected(reader, CTDA, TagList(CONDITION_TAGS))?;
        let mut compound = Self::from_subrecord(&sub)?;
        if reader.peek_tag() == Some(variant.tag()) {
            let string = read_subrecord(reader)?;
            compound.attach(&string)?;
        }
        Ok(compound)
    }

    /// Write the block, then the attached string if any
    ///
    /// An attached string that is present but empty fails with `EmptyText`.
    pub fn encode(&self, writer: &mut Writer, variant: StringVariant) -> Result<()> {
        write_subrecord(writer, CTDA, &self.condition)?;
        if let Some(text) = &self.attached {
            write_nonempty_text(writer, variant.tag(), text)?;
        }
        Ok(())
    }

    /// On-wire size of block and string
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        total_size([
            subrecord_size(width, CONDITION_SIZE),
            self.attached.as_ref().map_or(0, |text| text_size(width, text)),
        ])
    }
}

/// Attach a string subrecord to the last compound of `list`
///
/// `previous` is the last tag read, reported when the list has no CTDA yet.
pub fn attach_to_last(list: &mut [ConditionCompound], sub: &Subrecord, previous: Tag) -> Result<()> {
    match list.last_mut() {
        Some(last) => last.attach(sub),
        None => Err(CodecError::StructuralOrderViolation {
            tag: sub.tag,
            previous,
        }),
    }
}

/// Write every compound of `list` in order
pub fn encode_all(list: &[ConditionCompound], writer: &mut Writer, variant: StringVariant) -> Result<()> {
    list.iter().try_for_each(|c| c.encode(writer, variant))
}

/// Summed on-wire size of `list`
pub fn list_size(list: &[ConditionCompound], width: LengthWidth) -> u32 {
    total_size(list.iter().map(|c| c.encoded_size(width)))
}
