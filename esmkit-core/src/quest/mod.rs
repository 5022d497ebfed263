//! Quest (QUST) records
//!
//! A quest body is a flat run of subrecords that encodes a tree: stage
//! indices holding log entries, objectives holding targets, and alias
//! blocks. The decoder rebuilds that tree by tracking which block is open
//! and committing pending entities when the next block boundary arrives.
//!
//! Body layout as written by [`QuestRecord::encode`]:
//!
//! ```text
//! EDID VMAD? FULL? DNAM ENAM? QTGL* FLTR? (CTDA CIS2?)* NEXT
//! (INDX (QSDT NAM0? SCHR? SCTX? QNAM? (CTDA CIS2?)* CNAM?)+)*
//! (QOBJ FNAM NNAM? (QSTA (CTDA CIS2?)*)*)*
//! ANAM
//! (ALST|ALLS ... ALED)*
//! ```

pub mod alias;
pub mod objective;
pub mod stage;

pub use alias::{AliasEntry, Component};
pub use objective::{Objective, Target};
pub use stage::{StageIndex, StageLogEntry};

use crate::condition::{
    attach_to_last, encode_all, list_size, ConditionCompound, StringVariant,
};
use crate::constants::*;
use crate::cursor::{Reader, Writer};
use crate::error::CodecError;
use crate::fields::{
    read_array, read_marker, read_nonempty_text, read_raw_text, read_text,
    read_u16, read_u32, read_u64, read_u8, set_once, text_size, u32_size, write_marker,
    write_nonempty_text, write_text, write_u32,
};
use crate::localized::LocalizedText;
use crate::subrecord::{
    read_expected, read_subrecord, repeated_size, subrecord_size, total_size, write_subrecord,
    Subrecord,
};
use crate::types::{DecodeContext, RecordCodec, Tag, TagList};
use crate::Result;
use alloc::string::String;
use alloc::vec::Vec;
use bytes::Bytes;
use core::num::NonZeroU32;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

const QUEST_TAGS: &[Tag] = &[
    EDID, VMAD, FULL, DNAM, ENAM, QTGL, CTDA, CIS2, FLTR, NEXT, INDX, QSDT, NAM0, QNAM, SCHR, SCTX,
    CNAM, QOBJ, QSTA, ANAM, ALST, ALLS,
];
const OBJECTIVE_FLAG_TAGS: &[Tag] = &[FNAM];

/// A decoded quest record body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    /// EDID: editor id
    pub editor_id: String,

    /// VMAD: script blob, passed through unparsed
    pub script_blob: Option<Bytes>,

    /// FULL: display name
    pub display_name: Option<LocalizedText>,

    /// DNAM: quest data block
    pub data: [u8; QUEST_DATA_SIZE],

    /// ENAM
    pub enable_flag: Option<u32>,

    /// QTGL: quest target globals in file order
    pub target_globals: Vec<u32>,

    /// Conditions before NEXT, strings tagged CIS2
    pub conditions: Vec<ConditionCompound>,

    /// FLTR: object window filter, never empty when present
    pub filter: Option<String>,

    /// INDX blocks
    pub stages: Vec<StageIndex>,

    /// QOBJ blocks
    pub objectives: Vec<Objective>,

    /// ANAM: next alias id
    pub alias_control: u32,

    /// Alias blocks
    pub aliases: Vec<AliasEntry>,
}

impl QuestRecord {
    /// Empty quest with the given editor id
    pub fn new(editor_id: impl Into<String>) -> Self {
        Self {
            editor_id: editor_id.into(),
            ..Default::default()
        }
    }

    /// Find an objective by id
    pub fn objective(&self, id: u16) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Find a stage by index
    pub fn stage(&self, index: u16) -> Option<&StageIndex> {
        self.stages.iter().find(|s| s.index == index)
    }
}

/// Which block the decoder is inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    InStage,
    InObjective,
}

/// Decoder state for one quest body
///
/// Nothing in here escapes a failed decode.
struct QuestDecoder<'c, 'a> {
    ctx: &'c DecodeContext<'a>,
    quest: QuestRecord,
    editor_id: Option<String>,
    data: Option<[u8; QUEST_DATA_SIZE]>,
    alias_control: Option<u32>,
    seen_next: bool,
    sections_started: bool,
    block: Block,
    stage: Option<StageIndex>,
    entry: Option<StageLogEntry>,
    objective: Option<Objective>,
    target: Option<Target>,
    previous: Tag,
}

impl<'c, 'a> QuestDecoder<'c, 'a> {
    fn new(ctx: &'c DecodeContext<'a>) -> Self {
        Self {
            ctx,
            quest: QuestRecord::default(),
            editor_id: None,
            data: None,
            alias_control: None,
            seen_next: false,
            sections_started: false,
            block: Block::None,
            stage: None,
            entry: None,
            objective: None,
            target: None,
            previous: QUST,
        }
    }

    fn order_violation(&self, tag: Tag) -> CodecError {
        CodecError::StructuralOrderViolation {
            tag,
            previous: self.previous,
        }
    }

    fn commit_stage(&mut self) -> Result<()> {
        if let Some(mut stage) = self.stage.take() {
            if let Some(entry) = self.entry.take() {
                stage.entries.push(entry);
            }
            if stage.entries.is_empty() {
                return Err(CodecError::MissingRequiredField("QSDT"));
            }
            #[cfg(feature = "logging")]
            trace!("Committed stage {} ({} entries)", stage.index, stage.entries.len());
            self.quest.stages.push(stage);
        }
        Ok(())
    }

    fn commit_objective(&mut self) {
        if let Some(mut objective) = self.objective.take() {
            if let Some(target) = self.target.take() {
                objective.targets.push(target);
            }
            #[cfg(feature = "logging")]
            trace!("Committed objective {} ({} targets)", objective.id, objective.targets.len());
            self.quest.objectives.push(objective);
        }
    }

    fn commit_all(&mut self) -> Result<()> {
        self.commit_stage()?;
        self.commit_objective();
        self.block = Block::None;
        Ok(())
    }

    /// Condition list the next CTDA or CIS2 belongs to
    ///
    /// Top-level conditions end at the first INDX, QOBJ or ANAM.
    fn condition_list(&mut self, tag: Tag) -> Result<&mut Vec<ConditionCompound>> {
        match self.block {
            Block::None if self.sections_started => Err(CodecError::StructuralOrderViolation {
                tag,
                previous: self.previous,
            }),
            Block::None => Ok(&mut self.quest.conditions),
            Block::InStage => match self.entry.as_mut() {
                Some(entry) => Ok(&mut entry.conditions),
                None => Err(CodecError::StructuralOrderViolation {
                    tag,
                    previous: self.previous,
                }),
            },
            Block::InObjective => match self.target.as_mut() {
                Some(target) => Ok(&mut target.conditions),
                None => Err(CodecError::StructuralOrderViolation {
                    tag,
                    previous: self.previous,
                }),
            },
        }
    }

    /// Log entry the next stage-only subrecord belongs to
    fn open_entry(&mut self, tag: Tag) -> Result<&mut StageLogEntry> {
        let previous = self.previous;
        self.entry
            .as_mut()
            .ok_or(CodecError::StructuralOrderViolation { tag, previous })
    }

    fn step(&mut self, sub: Subrecord, reader: &mut Reader) -> Result<()> {
        match sub.tag {
            EDID => set_once(&mut self.editor_id, EDID, read_text(&sub)?)?,
            VMAD => set_once(&mut self.quest.script_blob, VMAD, sub.payload.clone())?,
            FULL => {
                let name = LocalizedText::decode(&sub, self.ctx)?;
                set_once(&mut self.quest.display_name, FULL, name)?;
            }
            DNAM => set_once(&mut self.data, DNAM, read_array(&sub)?)?,
            ENAM => set_once(&mut self.quest.enable_flag, ENAM, read_u32(&sub)?)?,
            QTGL => self.quest.target_globals.push(read_u32(&sub)?),
            FLTR => set_once(&mut self.quest.filter, FLTR, read_nonempty_text(&sub)?)?,
            NEXT => {
                read_marker(&sub)?;
                if self.seen_next {
                    return Err(CodecError::DuplicateSubrecord(NEXT));
                }
                self.seen_next = true;
            }
            CTDA => {
                let compound = ConditionCompound::from_subrecord(&sub)?;
                self.condition_list(CTDA)?.push(compound);
            }
            CIS2 => {
                let previous = self.previous;
                let list = self.condition_list(CIS2)?;
                attach_to_last(list, &sub, previous)?;
            }
            INDX => {
                let payload = read_array::<4>(&sub)?;
                self.commit_all()?;
                self.stage = Some(StageIndex::new(
                    u16::from_le_bytes([payload[0], payload[1]]),
                    u16::from_le_bytes([payload[2], payload[3]]),
                ));
                self.block = Block::InStage;
                self.sections_started = true;
            }
            QSDT => {
                if self.stage.is_none() {
                    return Err(self.order_violation(QSDT));
                }
                let is_finisher = read_u8(&sub)? != 0;
                if let (Some(stage), Some(entry)) = (self.stage.as_mut(), self.entry.take()) {
                    stage.entries.push(entry);
                }
                self.entry = Some(StageLogEntry::new(is_finisher));
            }
            NAM0 => {
                let value = NonZeroU32::new(read_u32(&sub)?)
                    .ok_or(CodecError::ZeroValueViolation(NAM0))?;
                let entry = self.open_entry(NAM0)?;
                set_once(&mut entry.next_quest, NAM0, value)?;
            }
            QNAM => {
                let value = read_u32(&sub)?;
                let entry = self.open_entry(QNAM)?;
                set_once(&mut entry.tag_value, QNAM, value)?;
            }
            SCHR => {
                let header = read_array::<SCRIPT_HEADER_SIZE>(&sub)?;
                let entry = self.open_entry(SCHR)?;
                set_once(&mut entry.script_header, SCHR, header)?;
            }
            SCTX => {
                let source = read_raw_text(&sub)?;
                let entry = self.open_entry(SCTX)?;
                set_once(&mut entry.script_source, SCTX, source)?;
            }
            CNAM => {
                self.open_entry(CNAM)?;
                let text = LocalizedText::decode(&sub, self.ctx)?;
                let entry = self.open_entry(CNAM)?;
                set_once(&mut entry.log_text, CNAM, text)?;
            }
            QOBJ => {
                let id = read_u16(&sub)?;
                self.commit_all()?;
                let fnam = read_expected(reader, FNAM, TagList(OBJECTIVE_FLAG_TAGS))?;
                let mut objective = Objective::new(id, read_u32(&fnam)?);
                self.previous = FNAM;
                if reader.peek_tag() == Some(NNAM) {
                    let nnam = read_subrecord(reader)?;
                    objective.display_text = Some(LocalizedText::decode(&nnam, self.ctx)?);
                    self.previous = NNAM;
                }
                self.objective = Some(objective);
                self.block = Block::InObjective;
                self.sections_started = true;
                return Ok(());
            }
            QSTA => {
                if self.objective.is_none() {
                    return Err(self.order_violation(QSTA));
                }
                let token = read_u64(&sub)?;
                if let (Some(objective), Some(target)) = (self.objective.as_mut(), self.target.take())
                {
                    objective.targets.push(target);
                }
                self.target = Some(Target::new(token));
            }
            ANAM => {
                let value = read_u32(&sub)?;
                self.commit_all()?;
                set_once(&mut self.alias_control, ANAM, value)?;
                self.sections_started = true;
            }
            ALST | ALLS => {
                let alias = AliasEntry::decode(&sub, reader)?;
                self.quest.aliases.push(alias);
                self.previous = ALED;
                return Ok(());
            }
            found => {
                return Err(CodecError::UnexpectedTag {
                    found,
                    allowed: TagList(QUEST_TAGS),
                })
            }
        }
        self.previous = sub.tag;
        Ok(())
    }

    fn finish(mut self) -> Result<QuestRecord> {
        self.commit_all()?;
        let mut quest = self.quest;
        quest.editor_id = self
            .editor_id
            .ok_or(CodecError::MissingRequiredField("EDID"))?;
        quest.data = self.data.ok_or(CodecError::MissingRequiredField("DNAM"))?;
        quest.alias_control = self
            .alias_control
            .ok_or(CodecError::MissingRequiredField("ANAM"))?;
        Ok(quest)
    }
}

impl RecordCodec for QuestRecord {
    const TAG: Tag = QUST;

    /// Decode a quest body, consuming the reader to its end
    fn decode(reader: &mut Reader, ctx: &DecodeContext<'_>) -> Result<Self> {
        #[cfg(feature = "logging")]
        debug!("Decoding quest body of {} bytes", reader.remaining());

        let mut decoder = QuestDecoder::new(ctx);
        while !reader.is_empty() {
            let sub = read_subrecord(reader)?;
            decoder.step(sub, reader)?;
        }
        let quest = decoder.finish()?;

        #[cfg(feature = "logging")]
        debug!(
            "Decoded quest {}: {} stages, {} objectives, {} aliases",
            quest.editor_id,
            quest.stages.len(),
            quest.objectives.len(),
            quest.aliases.len()
        );

        Ok(quest)
    }

    fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_text(writer, EDID, &self.editor_id)?;
        if let Some(blob) = &self.script_blob {
            write_subrecord(writer, VMAD, blob)?;
        }
        if let Some(name) = &self.display_name {
            name.encode(writer, FULL)?;
        }
        write_subrecord(writer, DNAM, &self.data)?;
        if let Some(value) = self.enable_flag {
            write_u32(writer, ENAM, value)?;
        }
        for &global in &self.target_globals {
            write_u32(writer, QTGL, global)?;
        }
        if let Some(filter) = &self.filter {
            write_nonempty_text(writer, FLTR, filter)?;
        }
        encode_all(&self.conditions, writer, StringVariant::Cis2)?;
        write_marker(writer, NEXT)?;
        for stage in &self.stages {
            stage.encode(writer)?;
        }
        for objective in &self.objectives {
            objective.encode(writer)?;
        }
        write_u32(writer, ANAM, self.alias_control)?;
        for alias in &self.aliases {
            alias.encode(writer)?;
        }
        Ok(())
    }

    fn encoded_size(&self, width: LengthWidth) -> u32 {
        total_size([
            text_size(width, &self.editor_id),
            subrecord_size(width, QUEST_DATA_SIZE),
            subrecord_size(width, 0),
            u32_size(width),
            self.script_blob
                .as_ref()
                .map_or(0, |blob| subrecord_size(width, blob.len())),
            self.display_name
                .as_ref()
                .map_or(0, |name| name.encoded_size(width)),
            self.enable_flag.map_or(0, |_| u32_size(width)),
            repeated_size(self.target_globals.len(), u32_size(width)),
            self.filter.as_ref().map_or(0, |filter| text_size(width, filter)),
            list_size(&self.conditions, width),
            total_size(self.stages.iter().map(|s| s.encoded_size(width))),
            total_size(self.objectives.iter().map(|o| o.encoded_size(width))),
            total_size(self.aliases.iter().map(|a| a.encoded_size(width))),
        ])
    }
}
