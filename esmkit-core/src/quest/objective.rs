//! Objectives (QOBJ) and their targets (QSTA)

use crate::condition::{encode_all, list_size, ConditionCompound, StringVariant};
use crate::constants::{LengthWidth, FNAM, NNAM, QOBJ, QSTA};
use crate::cursor::Writer;
use crate::fields::{u32_size, write_u16, write_u32, write_u64};
use crate::localized::LocalizedText;
use crate::subrecord::{subrecord_size, total_size};
use crate::Result;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// An objective target (QSTA) with its conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target alias and flags packed into eight bytes
    pub token: u64,

    /// Conditions, strings tagged CIS2
    pub conditions: Vec<ConditionCompound>,
}

impl Target {
    /// Target without conditions
    pub fn new(token: u64) -> Self {
        Self {
            token,
            conditions: Vec::new(),
        }
    }

    /// Write QSTA and its conditions
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_u64(writer, QSTA, self.token)?;
        encode_all(&self.conditions, writer, StringVariant::Cis2)
    }

    /// On-wire size of the target
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        subrecord_size(width, 8).saturating_add(list_size(&self.conditions, width))
    }
}

/// A quest objective (QOBJ block)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective index
    pub id: u16,

    /// FNAM flags
    pub flags: u32,

    /// NNAM: text shown in the journal
    pub display_text: Option<LocalizedText>,

    /// Targets in file order
    pub targets: Vec<Target>,
}

impl Objective {
    /// Objective without text or targets
    pub fn new(id: u16, flags: u32) -> Self {
        Self {
            id,
            flags,
            display_text: None,
            targets: Vec::new(),
        }
    }

    /// Write QOBJ, FNAM, NNAM and the targets
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        write_u16(writer, QOBJ, self.id)?;
        write_u32(writer, FNAM, self.flags)?;
        if let Some(text) = &self.display_text {
            text.encode(writer, NNAM)?;
        }
        self.targets.iter().try_for_each(|t| t.encode(writer))
    }

    /// On-wire size of the objective
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        total_size([
            subrecord_size(width, 2),
            u32_size(width),
            self.display_text.as_ref().map_or(0, |t| t.encoded_size(width)),
            total_size(self.targets.iter().map(|t| t.encoded_size(width))),
        ])
    }
}
