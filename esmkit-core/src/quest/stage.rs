//! Stage indices (INDX) and their log entries (QSDT)

use crate::condition::{encode_all, list_size, ConditionCompound, StringVariant};
use crate::constants::{
    LengthWidth, CNAM, INDX, NAM0, QNAM, QSDT, SCHR, SCRIPT_HEADER_SIZE, SCTX,
};
use crate::cursor::Writer;
use crate::fields::{raw_text_size, u32_size, write_raw_text, write_u32};
use crate::localized::LocalizedText;
use crate::subrecord::{subrecord_size, total_size, write_subrecord};
use crate::Result;
use alloc::string::String;
use alloc::vec::Vec;
use core::num::NonZeroU32;
use serde::{Deserialize, Serialize};

/// One log entry of a stage (QSDT block)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLogEntry {
    /// Completing this stage finishes the quest
    pub is_finisher: bool,

    /// NAM0: quest to start next; zero is invalid on the wire
    pub next_quest: Option<NonZeroU32>,

    /// SCHR: compiled script header
    pub script_header: Option<[u8; SCRIPT_HEADER_SIZE]>,

    /// SCTX: script source, never empty when present
    pub script_source: Option<String>,

    /// QNAM
    pub tag_value: Option<u32>,

    /// Conditions in evaluation order, strings tagged CIS2
    pub conditions: Vec<ConditionCompound>,

    /// CNAM: journal text
    pub log_text: Option<LocalizedText>,
}

impl StageLogEntry {
    /// Empty entry with the given finisher flag
    pub fn new(is_finisher: bool) -> Self {
        Self {
            is_finisher,
            ..Default::default()
        }
    }

    /// Write QSDT and the entry's optional subrecords
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_subrecord(writer, QSDT, &[u8::from(self.is_finisher)])?;
        if let Some(next) = self.next_quest {
            write_u32(writer, NAM0, next.get())?;
        }
        if let Some(header) = &self.script_header {
            write_subrecord(writer, SCHR, header)?;
        }
        if let Some(source) = &self.script_source {
            write_raw_text(writer, SCTX, source)?;
        }
        if let Some(value) = self.tag_value {
            write_u32(writer, QNAM, value)?;
        }
        encode_all(&self.conditions, writer, StringVariant::Cis2)?;
        if let Some(text) = &self.log_text {
            text.encode(writer, CNAM)?;
        }
        Ok(())
    }

    /// On-wire size of the entry
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        let scalar = u32_size(width);
        total_size([
            subrecord_size(width, 1),
            self.next_quest.map_or(0, |_| scalar),
            self.script_header
                .map_or(0, |_| subrecord_size(width, SCRIPT_HEADER_SIZE)),
            self.script_source
                .as_ref()
                .map_or(0, |source| raw_text_size(width, source)),
            self.tag_value.map_or(0, |_| scalar),
            list_size(&self.conditions, width),
            self.log_text.as_ref().map_or(0, |text| text.encoded_size(width)),
        ])
    }
}

/// A quest stage (INDX block) with its log entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageIndex {
    /// Stage number
    pub index: u16,

    /// Stage flags
    pub flags: u16,

    /// Log entries, never empty once decoded
    pub entries: Vec<StageLogEntry>,
}

impl StageIndex {
    /// Stage without entries
    pub fn new(index: u16, flags: u16) -> Self {
        Self {
            index,
            flags,
            entries: Vec::new(),
        }
    }

    /// True if any log entry finishes the quest
    pub fn has_finisher(&self) -> bool {
        self.entries.iter().any(|e| e.is_finisher)
    }

    /// Write INDX followed by every entry
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        let mut payload = [0u8; 4];
        payload[..2].copy_from_slice(&self.index.to_le_bytes());
        payload[2..].copy_from_slice(&self.flags.to_le_bytes());
        write_subrecord(writer, INDX, &payload)?;
        self.entries.iter().try_for_each(|e| e.encode(writer))
    }

    /// On-wire size of the stage
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        subrecord_size(width, 4)
            .saturating_add(total_size(self.entries.iter().map(|e| e.encoded_size(width))))
    }
}
