//! Property-based tests using proptest

use bytes::Bytes;
use esmkit_core::{
    quest::{AliasEntry, Component, Objective, StageIndex, StageLogEntry, Target},
    scanner::scan_records,
    ConditionCompound, DecodeContext, LengthWidth, LocalizedText, QuestRecord, Reader,
    RecordCodec, StringTable, Writer,
};
use proptest::prelude::*;
use std::num::NonZeroU32;

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_ ]{1,40}"
}

/// Keys present in the table used for localized decoding
const TABLE_KEYS: u32 = 3;

fn string_table() -> StringTable {
    let mut table = StringTable::new();
    for key in 1..=TABLE_KEYS {
        table.insert(key, format!("text {key}"));
    }
    table
}

/// Localized text in the form a file of the given kind stores it
///
/// Key 0 decodes without a table lookup; the others resolve against
/// `string_table()`.
fn localized_text(localized: bool) -> BoxedStrategy<LocalizedText> {
    if localized {
        (0..=TABLE_KEYS)
            .prop_map(|key| LocalizedText::index(key, ""))
            .boxed()
    } else {
        text().prop_map(LocalizedText::inline).boxed()
    }
}

fn form_id() -> impl Strategy<Value = Option<NonZeroU32>> {
    prop::option::of(1u32..).prop_map(|id| id.and_then(NonZeroU32::new))
}

fn condition() -> impl Strategy<Value = ConditionCompound> {
    (any::<[u8; 32]>(), prop::option::of(text())).prop_map(|(block, attached)| {
        ConditionCompound {
            condition: block,
            attached,
        }
    })
}

prop_compose! {
    fn log_entry(localized: bool)(
        is_finisher in any::<bool>(),
        next_quest in form_id(),
        script_header in prop::option::of(any::<[u8; 20]>()),
        tag_value in prop::option::of(any::<u32>()),
        script_source in prop::option::of(text()),
        conditions in prop::collection::vec(condition(), 0..3),
        log_text in prop::option::of(localized_text(localized)),
    ) -> StageLogEntry {
        StageLogEntry {
            is_finisher,
            next_quest,
            script_header,
            script_source,
            tag_value,
            conditions,
            log_text,
        }
    }
}

prop_compose! {
    fn stage(localized: bool)(
        index in any::<u16>(),
        flags in any::<u16>(),
        entries in prop::collection::vec(log_entry(localized), 1..3),
    ) -> StageIndex {
        StageIndex { index, flags, entries }
    }
}

prop_compose! {
    fn objective(localized: bool)(
        id in any::<u16>(),
        flags in any::<u32>(),
        display_text in prop::option::of(localized_text(localized)),
        targets in prop::collection::vec(
            (any::<u64>(), prop::collection::vec(condition(), 0..2)),
            0..3,
        ),
    ) -> Objective {
        let mut objective = Objective::new(id, flags);
        objective.display_text = display_text;
        objective.targets = targets
            .into_iter()
            .map(|(token, conditions)| Target { token, conditions })
            .collect();
        objective
    }
}

prop_compose! {
    fn alias()(
        location in any::<bool>(),
        id in any::<u32>(),
        flags in any::<u32>(),
        name in prop::option::of(text()),
        scalars in prop::collection::vec(prop::option::of(any::<u32>()), 10),
        ids in prop::collection::vec(form_id(), 12),
        components in prop::collection::vec((any::<u32>(), any::<u32>()), 0..3),
        conditions in prop::collection::vec(condition(), 0..3),
        lists in prop::collection::vec(prop::collection::vec(any::<u32>(), 0..3), 4),
    ) -> AliasEntry {
        let mut alias = if location {
            AliasEntry::location(id, flags)
        } else {
            AliasEntry::reference(id, flags)
        };
        alias.name = name;

        alias.force_into_alias = scalars[0];
        alias.create_at = scalars[1];
        alias.create_level = scalars[2];
        alias.from_event = scalars[3];
        alias.event_data = scalars[4];
        alias.forced_into_alias = scalars[5];
        alias.near_alias = scalars[6];
        alias.near_alias_type = scalars[7];
        alias.external_alias = scalars[8];
        alias.voice_type = scalars[9];

        alias.location_ref_type = ids[0];
        alias.create_reference_to = ids[1];
        alias.display_name = ids[2];
        alias.specific_location = ids[3];
        alias.specific_reference = ids[4];
        alias.unique_actor = ids[5];
        alias.external_alias_reference = ids[6];
        alias.keyword = ids[7];
        alias.spectator_override = ids[8];
        alias.observe_dead_body_override = ids[9];
        alias.guard_warn_override = ids[10];
        alias.combat_override = ids[11];

        alias.components = components
            .into_iter()
            .map(|(form_id, count)| Component { form_id, count })
            .collect();
        alias.conditions = conditions;
        alias.keywords = lists[0].clone();
        alias.spells = lists[1].clone();
        alias.factions = lists[2].clone();
        alias.packages = lists[3].clone();
        alias
    }
}

prop_compose! {
    fn quest(localized: bool)(
        editor_id in text(),
        head in (
            prop::option::of(prop::collection::vec(any::<u8>(), 0..64)),
            prop::option::of(localized_text(localized)),
            any::<[u8; 12]>(),
        ),
        enable_flag in prop::option::of(any::<u32>()),
        target_globals in prop::collection::vec(any::<u32>(), 0..3),
        filter in prop::option::of(text()),
        conditions in prop::collection::vec(condition(), 0..3),
        stages in prop::collection::vec(stage(localized), 0..3),
        objectives in prop::collection::vec(objective(localized), 0..3),
        alias_control in any::<u32>(),
        aliases in prop::collection::vec(alias(), 0..3),
    ) -> QuestRecord {
        let (script_blob, display_name, data) = head;
        QuestRecord {
            editor_id,
            script_blob: script_blob.map(Bytes::from),
            display_name,
            data,
            enable_flag,
            target_globals,
            filter,
            conditions,
            stages,
            objectives,
            alias_control,
            aliases,
        }
    }
}

fn any_quest() -> impl Strategy<Value = (QuestRecord, bool)> {
    any::<bool>().prop_flat_map(|localized| (quest(localized), Just(localized)))
}

fn encode(quest: &QuestRecord, width: LengthWidth) -> Vec<u8> {
    let mut writer = Writer::new(width);
    quest.encode(&mut writer).unwrap();
    writer.freeze().to_vec()
}

proptest! {
    #[test]
    fn prop_round_trip_encode_decode(
        (quest, localized) in any_quest(),
        wide in any::<bool>(),
    ) {
        let width = if wide { LengthWidth::U32 } else { LengthWidth::U16 };
        let bytes = encode(&quest, width);

        let table = string_table();
        let ctx = DecodeContext::new(localized, &table);
        let mut reader = Reader::new(bytes, width);
        let decoded = QuestRecord::decode(&mut reader, &ctx).unwrap();

        prop_assert!(decoded.structural_equals(&quest));
        prop_assert_eq!(decoded, quest);
    }

    #[test]
    fn prop_encoded_size_matches_output(
        (quest, _) in any_quest(),
        wide in any::<bool>(),
    ) {
        let width = if wide { LengthWidth::U32 } else { LengthWidth::U16 };
        let bytes = encode(&quest, width);
        prop_assert_eq!(bytes.len() as u32, quest.encoded_size(width));
    }

    #[test]
    fn prop_decode_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..4096),
        localized in any::<bool>(),
    ) {
        // Errors are fine, panics are not
        let table = string_table();
        let ctx = DecodeContext::new(localized, &table);
        let mut reader = Reader::new(data, LengthWidth::U16);
        let _ = QuestRecord::decode(&mut reader, &ctx);
    }

    #[test]
    fn prop_truncated_encoding_fails(quest in quest(false), cut in 1usize..6) {
        // Every body ends with ANAM or ALED, both longer than the cut
        let bytes = encode(&quest, LengthWidth::U16);
        let keep = bytes.len().saturating_sub(cut);

        let table = StringTable::new();
        let ctx = DecodeContext::inline(&table);
        let mut reader = Reader::new(bytes[..keep].to_vec(), LengthWidth::U16);
        prop_assert!(QuestRecord::decode(&mut reader, &ctx).is_err());
    }

    #[test]
    fn prop_scan_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..8192)
    ) {
        let table = StringTable::new();
        let ctx = DecodeContext::inline(&table);
        let _ = scan_records(&data, LengthWidth::U16, &ctx);
    }
}
