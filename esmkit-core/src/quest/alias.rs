//! Alias entries: the ALST/ALLS ... ALED blocks at the end of a quest

use crate::condition::{attach_to_last, encode_all, list_size, ConditionCompound, StringVariant};
use crate::constants::*;
use crate::cursor::{Reader, Writer};
use crate::error::CodecError;
use crate::fields::{
    expect_len, read_marker, read_nonempty_text, read_nonzero_u32, read_u32, set_once, text_size,
    u32_size, write_marker, write_nonempty_text, write_u32,
};
use crate::subrecord::{
    read_expected, read_subrecord, repeated_size, subrecord_size, total_size, write_subrecord,
    Subrecord,
};
use crate::types::{Tag, TagList};
use crate::Result;
use alloc::string::String;
use alloc::vec::Vec;
use core::num::NonZeroU32;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::trace;

const ALIAS_TAGS: &[Tag] = &[
    ALID, FNAM, ALFA, ALRT, ALCO, ALCA, ALCL, ALDN, COCT, CNTO, KSIZ, ALFE, ALFD, ALFI, ALFL, ALFR,
    ALNA, ALNT, ALUA, ALEQ, ALEA, KNAM, CTDA, CIS2, SPOR, OCOR, GWOR, ECOR, ALSP, ALFC, ALPC, VTCK,
    ALED,
];
const COMPONENT_TAGS: &[Tag] = &[CNTO];
const KEYWORD_TAGS: &[Tag] = &[KWDA];

/// One CNTO entry: an object and how many of it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Object form id
    pub form_id: u32,
    /// Item count
    pub count: u32,
}

impl Component {
    fn from_subrecord(sub: &Subrecord) -> Result<Self> {
        expect_len(sub, COMPONENT_SIZE)?;
        let p = &sub.payload;
        Ok(Self {
            form_id: u32::from_le_bytes([p[0], p[1], p[2], p[3]]),
            count: u32::from_le_bytes([p[4], p[5], p[6], p[7]]),
        })
    }

    fn to_bytes(self) -> [u8; COMPONENT_SIZE] {
        let mut out = [0u8; COMPONENT_SIZE];
        out[..4].copy_from_slice(&self.form_id.to_le_bytes());
        out[4..].copy_from_slice(&self.count.to_le_bytes());
        out
    }
}

/// A quest alias
///
/// Exactly one of `alst` and `alls` must be set for the entry to encode.
/// Decoding sets whichever start marker it read. Fields typed
/// `Option<NonZeroU32>` hold form ids whose zero value is rejected on the
/// wire; absence means the subrecord is not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// ALST: reference alias id
    pub alst: Option<u32>,
    /// ALLS: location alias id
    pub alls: Option<u32>,
    /// ALID: alias name
    pub name: Option<String>,
    /// FNAM: alias flags (required)
    pub flags: u32,
    /// ALFA
    pub force_into_alias: Option<u32>,
    /// ALRT: location reference type
    pub location_ref_type: Option<NonZeroU32>,
    /// ALCO: object to create a reference to
    pub create_reference_to: Option<NonZeroU32>,
    /// ALCA
    pub create_at: Option<u32>,
    /// ALCL
    pub create_level: Option<u32>,
    /// ALDN: display name
    pub display_name: Option<NonZeroU32>,
    /// COCT/CNTO: components
    pub components: Vec<Component>,
    /// KSIZ/KWDA: keyword form ids
    pub keywords: Vec<u32>,
    /// ALFE
    pub from_event: Option<u32>,
    /// ALFD
    pub event_data: Option<u32>,
    /// ALFI
    pub forced_into_alias: Option<u32>,
    /// ALFL: specific location
    pub specific_location: Option<NonZeroU32>,
    /// ALFR: specific reference
    pub specific_reference: Option<NonZeroU32>,
    /// ALNA
    pub near_alias: Option<u32>,
    /// ALNT
    pub near_alias_type: Option<u32>,
    /// ALUA: unique actor
    pub unique_actor: Option<NonZeroU32>,
    /// ALEQ: external alias reference
    pub external_alias_reference: Option<NonZeroU32>,
    /// ALEA
    pub external_alias: Option<u32>,
    /// KNAM: keyword
    pub keyword: Option<NonZeroU32>,
    /// Conditions, strings tagged CIS2
    pub conditions: Vec<ConditionCompound>,
    /// SPOR: spectator override package list
    pub spectator_override: Option<NonZeroU32>,
    /// OCOR: observe dead body override package list
    pub observe_dead_body_override: Option<NonZeroU32>,
    /// GWOR: guard warn override package list
    pub guard_warn_override: Option<NonZeroU32>,
    /// ECOR: combat override package list
    pub combat_override: Option<NonZeroU32>,
    /// ALSP: spells
    pub spells: Vec<u32>,
    /// ALFC: factions
    pub factions: Vec<u32>,
    /// ALPC: package data
    pub packages: Vec<u32>,
    /// VTCK: voice type
    pub voice_type: Option<u32>,
}

fn set_nonzero(slot: &mut Option<NonZeroU32>, sub: &Subrecord) -> Result<()> {
    if slot.is_some() {
        return Err(CodecError::DuplicateSubrecord(sub.tag));
    }
    let value = read_nonzero_u32(sub)?;
    *slot = NonZeroU32::new(value);
    Ok(())
}

fn set_u32(slot: &mut Option<u32>, sub: &Subrecord) -> Result<()> {
    let value = read_u32(sub)?;
    set_once(slot, sub.tag, value)
}

impl AliasEntry {
    /// Reference alias (ALST)
    pub fn reference(id: u32, flags: u32) -> Self {
        Self {
            alst: Some(id),
            flags,
            ..Default::default()
        }
    }

    /// Location alias (ALLS)
    pub fn location(id: u32, flags: u32) -> Self {
        Self {
            alls: Some(id),
            flags,
            ..Default::default()
        }
    }

    /// Decode the rest of an alias block after its start marker `start`,
    /// up to and including ALED
    pub fn decode(start: &Subrecord, reader: &mut Reader) -> Result<Self> {
        let id = read_u32(start)?;
        let mut entry = AliasEntry::default();
        if start.tag == ALLS {
            entry.alls = Some(id);
        } else {
            entry.alst = Some(id);
        }

        let mut flags = None;
        let mut previous = start.tag;
        loop {
            let sub = read_subrecord(reader)?;
            match sub.tag {
                ALID => set_once(&mut entry.name, ALID, read_nonempty_text(&sub)?)?,
                FNAM => set_u32(&mut flags, &sub)?,
                ALFA => set_u32(&mut entry.force_into_alias, &sub)?,
                ALRT => set_nonzero(&mut entry.location_ref_type, &sub)?,
                ALCO => set_nonzero(&mut entry.create_reference_to, &sub)?,
                ALCA => set_u32(&mut entry.create_at, &sub)?,
                ALCL => set_u32(&mut entry.create_level, &sub)?,
                ALDN => set_nonzero(&mut entry.display_name, &sub)?,
                COCT => {
                    if !entry.components.is_empty() {
                        return Err(CodecError::DuplicateSubrecord(COCT));
                    }
                    let count = read_nonzero_u32(&sub)?;
                    for _ in 0..count {
                        let cnto = read_expected(reader, CNTO, TagList(COMPONENT_TAGS))?;
                        entry.components.push(Component::from_subrecord(&cnto)?);
                    }
                }
                // A CNTO without COCT counts as a single component
                CNTO => entry.components.push(Component::from_subrecord(&sub)?),
                KSIZ => {
                    if !entry.keywords.is_empty() {
                        return Err(CodecError::DuplicateSubrecord(KSIZ));
                    }
                    let count = read_nonzero_u32(&sub)? as usize;
                    let kwda = read_expected(reader, KWDA, TagList(KEYWORD_TAGS))?;
                    expect_len(&kwda, count.saturating_mul(4))?;
                    entry.keywords = kwda
                        .payload
                        .chunks_exact(4)
                        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                        .collect();
                }
                ALFE => set_u32(&mut entry.from_event, &sub)?,
                ALFD => set_u32(&mut entry.event_data, &sub)?,
                ALFI => set_u32(&mut entry.forced_into_alias, &sub)?,
                ALFL => set_nonzero(&mut entry.specific_location, &sub)?,
                ALFR => set_nonzero(&mut entry.specific_reference, &sub)?,
                ALNA => set_u32(&mut entry.near_alias, &sub)?,
                ALNT => set_u32(&mut entry.near_alias_type, &sub)?,
                ALUA => set_nonzero(&mut entry.unique_actor, &sub)?,
                ALEQ => set_nonzero(&mut entry.external_alias_reference, &sub)?,
                ALEA => set_u32(&mut entry.external_alias, &sub)?,
                KNAM => set_nonzero(&mut entry.keyword, &sub)?,
                CTDA => entry.conditions.push(ConditionCompound::from_subrecord(&sub)?),
                CIS2 => attach_to_last(&mut entry.conditions, &sub, previous)?,
                SPOR => set_nonzero(&mut entry.spectator_override, &sub)?,
                OCOR => set_nonzero(&mut entry.observe_dead_body_override, &sub)?,
                GWOR => set_nonzero(&mut entry.guard_warn_override, &sub)?,
                ECOR => set_nonzero(&mut entry.combat_override, &sub)?,
                ALSP => entry.spells.push(read_u32(&sub)?),
                ALFC => entry.factions.push(read_u32(&sub)?),
                ALPC => entry.packages.push(read_u32(&sub)?),
                VTCK => set_u32(&mut entry.voice_type, &sub)?,
                ALED => {
                    read_marker(&sub)?;
                    break;
                }
                found => {
                    return Err(CodecError::UnexpectedTag {
                        found,
                        allowed: TagList(ALIAS_TAGS),
                    })
                }
            }
            previous = sub.tag;
        }

        entry.flags = flags.ok_or(CodecError::MissingRequiredField("FNAM"))?;

        #[cfg(feature = "logging")]
        trace!(
            "Decoded alias {:?} with {} conditions",
            entry.name,
            entry.conditions.len()
        );

        Ok(entry)
    }

    /// Check the start marker rule: exactly one of ALST and ALLS
    pub fn start_marker(&self) -> Result<(Tag, u32)> {
        match (self.alst, self.alls) {
            (Some(id), None) => Ok((ALST, id)),
            (None, Some(id)) => Ok((ALLS, id)),
            (alst, alls) => Err(CodecError::AliasStartMarker {
                alst: alst.is_some(),
                alls: alls.is_some(),
            }),
        }
    }

    /// Write the whole block, ending with ALED
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        let (start, id) = self.start_marker()?;
        write_u32(writer, start, id)?;
        if let Some(name) = &self.name {
            write_nonempty_text(writer, ALID, name)?;
        }
        write_u32(writer, FNAM, self.flags)?;
        put_u32(writer, ALFA, self.force_into_alias)?;
        put_nonzero(writer, ALRT, self.location_ref_type)?;
        put_nonzero(writer, ALCO, self.create_reference_to)?;
        put_u32(writer, ALCA, self.create_at)?;
        put_u32(writer, ALCL, self.create_level)?;
        put_nonzero(writer, ALDN, self.display_name)?;
        if !self.components.is_empty() {
            write_u32(writer, COCT, self.components.len() as u32)?;
            for component in &self.components {
                write_subrecord(writer, CNTO, &component.to_bytes())?;
            }
        }
        if !self.keywords.is_empty() {
            write_u32(writer, KSIZ, self.keywords.len() as u32)?;
            let payload: Vec<u8> = self.keywords.iter().flat_map(|k| k.to_le_bytes()).collect();
            write_subrecord(writer, KWDA, &payload)?;
        }
        put_u32(writer, ALFE, self.from_event)?;
        put_u32(writer, ALFD, self.event_data)?;
        put_u32(writer, ALFI, self.forced_into_alias)?;
        put_nonzero(writer, ALFL, self.specific_location)?;
        put_nonzero(writer, ALFR, self.specific_reference)?;
        put_u32(writer, ALNA, self.near_alias)?;
        put_u32(writer, ALNT, self.near_alias_type)?;
        put_nonzero(writer, ALUA, self.unique_actor)?;
        put_nonzero(writer, ALEQ, self.external_alias_reference)?;
        put_u32(writer, ALEA, self.external_alias)?;
        put_nonzero(writer, KNAM, self.keyword)?;
        encode_all(&self.conditions, writer, StringVariant::Cis2)?;
        put_nonzero(writer, SPOR, self.spectator_override)?;
        put_nonzero(writer, OCOR, self.observe_dead_body_override)?;
        put_nonzero(writer, GWOR, self.guard_warn_override)?;
        put_nonzero(writer, ECOR, self.combat_override)?;
        for &spell in &self.spells {
            write_u32(writer, ALSP, spell)?;
        }
        for &faction in &self.factions {
            write_u32(writer, ALFC, faction)?;
        }
        for &package in &self.packages {
            write_u32(writer, ALPC, package)?;
        }
        put_u32(writer, VTCK, self.voice_type)?;
        write_marker(writer, ALED)
    }

    /// On-wire size of the block
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        let scalar = u32_size(width);
        let optional_u32 = [
            self.force_into_alias,
            self.create_at,
            self.create_level,
            self.from_event,
            self.event_data,
            self.forced_into_alias,
            self.near_alias,
            self.near_alias_type,
            self.external_alias,
            self.voice_type,
        ];
        let optional_ids = [
            self.location_ref_type,
            self.create_reference_to,
            self.display_name,
            self.specific_location,
            self.specific_reference,
            self.unique_actor,
            self.external_alias_reference,
            self.keyword,
            self.spectator_override,
            self.observe_dead_body_override,
            self.guard_warn_override,
            self.combat_override,
        ];

        let present = optional_u32.iter().filter(|v| v.is_some()).count()
            + optional_ids.iter().filter(|v| v.is_some()).count();
        let components = if self.components.is_empty() {
            0
        } else {
            scalar.saturating_add(repeated_size(
                self.components.len(),
                subrecord_size(width, COMPONENT_SIZE),
            ))
        };
        let keywords = if self.keywords.is_empty() {
            0
        } else {
            scalar.saturating_add(subrecord_size(
                width,
                self.keywords.len().saturating_mul(4),
            ))
        };
        let ids = self.spells.len() + self.factions.len() + self.packages.len();

        total_size([
            // start marker + FNAM + ALED
            repeated_size(2, scalar),
            subrecord_size(width, 0),
            self.name.as_ref().map_or(0, |name| text_size(width, name)),
            repeated_size(present, scalar),
            components,
            keywords,
            list_size(&self.conditions, width),
            repeated_size(ids, scalar),
        ])
    }
}

fn put_u32(writer: &mut Writer, tag: Tag, value: Option<u32>) -> Result<()> {
    match value {
        Some(v) => write_u32(writer, tag, v),
        None => Ok(()),
    }
}

fn put_nonzero(writer: &mut Writer, tag: Tag, value: Option<NonZeroU32>) -> Result<()> {
    put_u32(writer, tag, value.map(NonZeroU32::get))
}
