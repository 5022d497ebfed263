//! Constants and limits for the ESM/ESP container format

use crate::types::Tag;
use serde::{Deserialize, Serialize};

/// Largest payload accepted for capped text subrecords, NUL terminator included
pub const MAX_TEXT_PAYLOAD: usize = 511;

/// Size of the opaque CTDA condition block
pub const CONDITION_SIZE: usize = 32;

/// Size of the quest DNAM block
pub const QUEST_DATA_SIZE: usize = 12;

/// Size of the compiled stage script header (SCHR)
pub const SCRIPT_HEADER_SIZE: usize = 20;

/// Size of a record header: tag, data size, flags, form id, revision, version, unknown
pub const RECORD_HEADER_SIZE: usize = 24;

/// Size of a group header; groups share the record header layout
pub const GROUP_HEADER_SIZE: usize = 24;

/// Size of one alias component entry (CNTO): form id + count
pub const COMPONENT_SIZE: usize = 8;

/// Size of the tag in front of every subrecord
pub const TAG_SIZE: usize = 4;

// Record and group tags
/// Quest record
pub const QUST: Tag = Tag::new(*b"QUST");
/// Group of records
pub const GRUP: Tag = Tag::new(*b"GRUP");

// Quest top-level subrecords
/// Editor id
pub const EDID: Tag = Tag::new(*b"EDID");
/// Script blob
pub const VMAD: Tag = Tag::new(*b"VMAD");
/// Display name
pub const FULL: Tag = Tag::new(*b"FULL");
/// Quest data block
pub const DNAM: Tag = Tag::new(*b"DNAM");
/// Optional enable value
pub const ENAM: Tag = Tag::new(*b"ENAM");
/// Quest target global
pub const QTGL: Tag = Tag::new(*b"QTGL");
/// Condition block
pub const CTDA: Tag = Tag::new(*b"CTDA");
/// Attached condition string, earlier variant
pub const CIS1: Tag = Tag::new(*b"CIS1");
/// Attached condition string, later variant
pub const CIS2: Tag = Tag::new(*b"CIS2");
/// Object window filter
pub const FLTR: Tag = Tag::new(*b"FLTR");
/// Marker between the header part and the stage part
pub const NEXT: Tag = Tag::new(*b"NEXT");
/// Stage index
pub const INDX: Tag = Tag::new(*b"INDX");
/// Stage log entry
pub const QSDT: Tag = Tag::new(*b"QSDT");
/// Next quest reference
pub const NAM0: Tag = Tag::new(*b"NAM0");
/// Log entry tag value
pub const QNAM: Tag = Tag::new(*b"QNAM");
/// Compiled script header
pub const SCHR: Tag = Tag::new(*b"SCHR");
/// Script source
pub const SCTX: Tag = Tag::new(*b"SCTX");
/// Log entry text
pub const CNAM: Tag = Tag::new(*b"CNAM");
/// Objective
pub const QOBJ: Tag = Tag::new(*b"QOBJ");
/// Objective flags, alias flags
pub const FNAM: Tag = Tag::new(*b"FNAM");
/// Objective display text
pub const NNAM: Tag = Tag::new(*b"NNAM");
/// Objective target
pub const QSTA: Tag = Tag::new(*b"QSTA");
/// Next alias id
pub const ANAM: Tag = Tag::new(*b"ANAM");

// Alias subrecords
/// Alias start marker, reference alias
pub const ALST: Tag = Tag::new(*b"ALST");
/// Alias start marker, location alias
pub const ALLS: Tag = Tag::new(*b"ALLS");
/// Alias name
pub const ALID: Tag = Tag::new(*b"ALID");
/// Alias force-into-alias-when-filled
pub const ALFA: Tag = Tag::new(*b"ALFA");
/// Location reference type
pub const ALRT: Tag = Tag::new(*b"ALRT");
/// Create reference to object
pub const ALCO: Tag = Tag::new(*b"ALCO");
/// Create at
pub const ALCA: Tag = Tag::new(*b"ALCA");
/// Create level
pub const ALCL: Tag = Tag::new(*b"ALCL");
/// Display name
pub const ALDN: Tag = Tag::new(*b"ALDN");
/// Component count
pub const COCT: Tag = Tag::new(*b"COCT");
/// Component entry
pub const CNTO: Tag = Tag::new(*b"CNTO");
/// Keyword count
pub const KSIZ: Tag = Tag::new(*b"KSIZ");
/// Keyword array
pub const KWDA: Tag = Tag::new(*b"KWDA");
/// From event
pub const ALFE: Tag = Tag::new(*b"ALFE");
/// From event data
pub const ALFD: Tag = Tag::new(*b"ALFD");
/// Forced into alias id
pub const ALFI: Tag = Tag::new(*b"ALFI");
/// Specific location
pub const ALFL: Tag = Tag::new(*b"ALFL");
/// Specific reference
pub const ALFR: Tag = Tag::new(*b"ALFR");
/// Near alias
pub const ALNA: Tag = Tag::new(*b"ALNA");
/// Near alias type
pub const ALNT: Tag = Tag::new(*b"ALNT");
/// Unique actor
pub const ALUA: Tag = Tag::new(*b"ALUA");
/// External alias reference
pub const ALEQ: Tag = Tag::new(*b"ALEQ");
/// External alias id
pub const ALEA: Tag = Tag::new(*b"ALEA");
/// Keyword
pub const KNAM: Tag = Tag::new(*b"KNAM");
/// Spectator override package list
pub const SPOR: Tag = Tag::new(*b"SPOR");
/// Observe dead body override package list
pub const OCOR: Tag = Tag::new(*b"OCOR");
/// Guard warn override package list
pub const GWOR: Tag = Tag::new(*b"GWOR");
/// Combat override package list
pub const ECOR: Tag = Tag::new(*b"ECOR");
/// Alias spell
pub const ALSP: Tag = Tag::new(*b"ALSP");
/// Alias faction
pub const ALFC: Tag = Tag::new(*b"ALFC");
/// Alias package data
pub const ALPC: Tag = Tag::new(*b"ALPC");
/// Voice type
pub const VTCK: Tag = Tag::new(*b"VTCK");
/// Alias end marker
pub const ALED: Tag = Tag::new(*b"ALED");

/// Width of the length prefix in front of every subrecord payload
///
/// Later-era containers use two bytes, earlier-era ones four. The active
/// width is a property of the file being processed and is chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthWidth {
    /// 2-byte little-endian length
    #[default]
    U16,
    /// 4-byte little-endian length
    U32,
}

impl LengthWidth {
    /// Returns the size of the length prefix in bytes
    pub const fn size(&self) -> usize {
        match self {
            LengthWidth::U16 => 2,
            LengthWidth::U32 => 4,
        }
    }

    /// Largest payload length this width can express
    pub const fn max_payload(&self) -> usize {
        match self {
            LengthWidth::U16 => u16::MAX as usize,
            LengthWidth::U32 => u32::MAX as usize,
        }
    }

    /// Tag plus length prefix
    pub const fn overhead(&self) -> usize {
        TAG_SIZE + self.size()
    }
}

/// Record header flags (stored as a little-endian u32)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordFlags(u32);

impl RecordFlags {
    /// No flags set
    pub const NONE: u32 = 0;

    /// Master file (only meaningful on the file header record)
    pub const MASTER: u32 = 0x0000_0001;

    /// Record is deleted
    pub const DELETED: u32 = 0x0000_0020;

    /// Strings are stored in external string tables (file header record)
    pub const LOCALIZED: u32 = 0x0000_0080;

    /// Record body is zlib-compressed
    pub const COMPRESSED: u32 = 0x0004_0000;

    /// Create flags from the raw value
    pub const fn new(flags: u32) -> Self {
        Self(flags)
    }

    /// Get the raw value
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Check if the record body is compressed
    pub const fn is_compressed(&self) -> bool {
        (self.0 & Self::COMPRESSED) != 0
    }

    /// Check if the record is marked deleted
    pub const fn is_deleted(&self) -> bool {
        (self.0 & Self::DELETED) != 0
    }

    /// Check if the localized flag is set
    pub const fn is_localized(&self) -> bool {
        (self.0 & Self::LOCALIZED) != 0
    }

    /// Set a flag
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clear a flag
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }
}
