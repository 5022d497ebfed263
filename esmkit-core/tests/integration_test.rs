//! Integration tests for quest decode → inspect → re-encode

use esmkit_core::{
    constants::{ANAM, CIS2, CNAM, CTDA, EDID, INDX, NAM0, NEXT, QSDT, QSTA},
    quest::AliasEntry,
    ConditionCompound, CodecError, DecodeContext, LengthWidth, LocalizedText, QuestRecord,
    Reader, RecordCodec, StringTable, StringVariant, Tag, Writer,
};
use std::num::NonZeroU32;

const W: LengthWidth = LengthWidth::U16;

fn sub(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn u32_sub(tag: &[u8; 4], value: u32) -> Vec<u8> {
    sub(tag, &value.to_le_bytes())
}

fn condition_block(seed: u8) -> [u8; 32] {
    let mut block = [0u8; 32];
    for (i, b) in block.iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    block
}

fn head(editor_id: &str) -> Vec<u8> {
    let mut text = editor_id.as_bytes().to_vec();
    text.push(0);
    let mut out = sub(b"EDID", &text);
    out.extend(sub(b"DNAM", &[0u8; 12]));
    out.extend(sub(b"NEXT", b""));
    out
}

fn decode(body: &[u8]) -> Result<QuestRecord, CodecError> {
    let table = StringTable::new();
    let ctx = DecodeContext::inline(&table);
    let mut reader = Reader::new(body.to_vec(), W);
    QuestRecord::decode(&mut reader, &ctx)
}

fn encode(quest: &QuestRecord) -> Vec<u8> {
    let mut writer = Writer::new(W);
    quest.encode(&mut writer).unwrap();
    assert_eq!(writer.len() as u32, quest.encoded_size(W));
    writer.freeze().to_vec()
}

fn three_stages() -> Vec<u8> {
    let schr = hex::decode("0000000001000000020000000300000004000000").unwrap();

    let mut body = head("ScenarioStages");
    body.extend(sub(b"INDX", b"\x0A\0\0\0"));
    body.extend(sub(b"QSDT", b"\0"));
    body.extend(sub(b"CNAM", b"Started\0"));

    body.extend(sub(b"INDX", b"\x14\0\x01\0"));
    body.extend(sub(b"QSDT", b"\x01"));
    body.extend(sub(b"SCHR", &schr));
    body.extend(sub(b"SCTX", b"SetStage 30"));
    body.extend(u32_sub(b"QNAM", 7));

    body.extend(sub(b"INDX", b"\x1E\0\0\0"));
    body.extend(sub(b"QSDT", b"\0"));
    body.extend(u32_sub(b"NAM0", 0x0001_2345));
    body.extend(sub(b"CTDA", &condition_block(3)));
    body.extend(sub(b"CIS2", b"abc\0"));

    body.extend(u32_sub(b"ANAM", 2));
    body
}

#[test]
fn test_three_stage_blocks() {
    let body = three_stages();
    let quest = decode(&body).unwrap();

    assert_eq!(quest.editor_id, "ScenarioStages");
    assert_eq!(quest.stages.len(), 3);
    assert!(quest.stages.iter().all(|s| s.entries.len() == 1));

    let first = &quest.stages[0].entries[0];
    assert_eq!(quest.stages[0].index, 10);
    assert!(!first.is_finisher);
    assert_eq!(first.log_text, Some(LocalizedText::inline("Started")));

    let second = &quest.stages[1];
    assert_eq!(second.index, 20);
    assert_eq!(second.flags, 1);
    assert!(second.has_finisher());
    let entry = &second.entries[0];
    assert_eq!(entry.script_header.map(|h| h[4]), Some(1));
    assert_eq!(entry.script_source.as_deref(), Some("SetStage 30"));
    assert_eq!(entry.tag_value, Some(7));
    assert_eq!(entry.log_text, None);

    let third = &quest.stage(30).unwrap().entries[0];
    assert_eq!(third.next_quest, NonZeroU32::new(0x0001_2345));
    assert_eq!(third.conditions.len(), 1);
    assert_eq!(third.conditions[0].attached.as_deref(), Some("abc"));
    assert!(quest.conditions.is_empty());
    assert_eq!(quest.alias_control, 2);

    assert_eq!(encode(&quest), body);
}

#[test]
fn test_objective_with_two_targets() {
    let mut body = head("ScenarioObjective");
    body.extend(sub(b"QOBJ", b"\x0A\0"));
    body.extend(u32_sub(b"FNAM", 1));
    body.extend(sub(b"NNAM", b"Find the thing\0"));
    body.extend(sub(b"QSTA", &0x0000_0001_0000_0014u64.to_le_bytes()));
    body.extend(sub(b"QSTA", &0x0000_0000_0000_0015u64.to_le_bytes()));
    body.extend(u32_sub(b"ANAM", 0));

    let quest = decode(&body).unwrap();
    assert_eq!(quest.objectives.len(), 1);
    let objective = &quest.objectives[0];
    assert_eq!(objective.id, 10);
    assert_eq!(objective.targets.len(), 2);
    assert_eq!(objective.targets[0].token, 0x0000_0001_0000_0014);
    assert!(objective.targets.iter().all(|t| t.conditions.is_empty()));
    assert_eq!(
        objective.display_text.as_ref().map(LocalizedText::text),
        Some("Find the thing")
    );

    assert_eq!(encode(&quest), body);
}

#[test]
fn test_localized_objective_text() {
    let mut body = head("Localized");
    body.extend(sub(b"QOBJ", b"\x01\0"));
    body.extend(u32_sub(b"FNAM", 0));
    body.extend(u32_sub(b"NNAM", 0x55));
    body.extend(u32_sub(b"ANAM", 0));

    let mut table = StringTable::new();
    table.insert(0x55, "Talk to the innkeeper");
    let ctx = DecodeContext::new(true, &table);
    let mut reader = Reader::new(body.clone(), W);
    let quest = QuestRecord::decode(&mut reader, &ctx).unwrap();

    let text = quest.objectives[0].display_text.as_ref().unwrap();
    assert!(text.is_index());
    assert_eq!(text.text(), "Talk to the innkeeper");
    assert_eq!(encode(&quest), body);
}

fn four_aliases() -> Vec<u8> {
    let mut body = head("ScenarioAliases");
    body.extend(u32_sub(b"ANAM", 4));

    body.extend(u32_sub(b"ALLS", 0));
    body.extend(sub(b"ALID", b"Town\0"));
    body.extend(u32_sub(b"FNAM", 0));
    body.extend(u32_sub(b"ALFL", 0x0001_6BB4));
    body.extend(sub(b"ALED", b""));

    body.extend(u32_sub(b"ALST", 1));
    body.extend(sub(b"ALID", b"Boss\0"));
    body.extend(u32_sub(b"FNAM", 0x0000_0200));
    body.extend(u32_sub(b"KSIZ", 2));
    body.extend(sub(b"KWDA", b"\x01\0\0\0\x02\0\0\0"));
    body.extend(u32_sub(b"ALFR", 0x0003_9F1A));
    body.extend(sub(b"CTDA", &condition_block(9)));
    body.extend(u32_sub(b"SPOR", 0x0010_0001));
    body.extend(u32_sub(b"OCOR", 0x0010_0002));
    body.extend(u32_sub(b"GWOR", 0x0010_0003));
    body.extend(u32_sub(b"ECOR", 0x0010_0004));
    body.extend(u32_sub(b"ALSP", 0x0002_0001));
    body.extend(u32_sub(b"ALSP", 0x0002_0002));
    body.extend(u32_sub(b"ALFC", 0x0003_0001));
    body.extend(u32_sub(b"ALPC", 0x0004_0001));
    body.extend(u32_sub(b"ALPC", 0x0004_0002));
    body.extend(u32_sub(b"VTCK", 0x0005_0001));
    body.extend(sub(b"ALED", b""));

    body.extend(u32_sub(b"ALST", 2));
    body.extend(u32_sub(b"FNAM", 0));
    body.extend(u32_sub(b"ALUA", 0x0001_3BA3));
    body.extend(u32_sub(b"ALSP", 0x0002_0003));
    body.extend(sub(b"ALED", b""));

    body.extend(u32_sub(b"ALST", 3));
    body.extend(u32_sub(b"FNAM", 0));
    body.extend(u32_sub(b"COCT", 1));
    body.extend(sub(b"CNTO", b"\x0F\0\0\0\x64\0\0\0"));
    body.extend(sub(b"ALED", b""));
    body
}

#[test]
fn test_four_alias_blocks() {
    let body = four_aliases();
    let quest = decode(&body).unwrap();

    assert_eq!(quest.aliases.len(), 4);
    assert_eq!(quest.alias_control, 4);

    let town = &quest.aliases[0];
    assert_eq!((town.alst, town.alls), (None, Some(0)));
    assert_eq!(town.name.as_deref(), Some("Town"));
    assert_eq!(town.specific_location, NonZeroU32::new(0x0001_6BB4));

    let boss = &quest.aliases[1];
    assert_eq!((boss.alst, boss.alls), (Some(1), None));
    assert_eq!(boss.keywords, vec![1, 2]);
    assert_eq!(boss.conditions.len(), 1);
    assert_eq!(boss.spectator_override, NonZeroU32::new(0x0010_0001));
    assert_eq!(boss.observe_dead_body_override, NonZeroU32::new(0x0010_0002));
    assert_eq!(boss.guard_warn_override, NonZeroU32::new(0x0010_0003));
    assert_eq!(boss.combat_override, NonZeroU32::new(0x0010_0004));
    assert_eq!(boss.spells, vec![0x0002_0001, 0x0002_0002]);
    assert_eq!(boss.factions, vec![0x0003_0001]);
    assert_eq!(boss.packages, vec![0x0004_0001, 0x0004_0002]);
    assert_eq!(boss.voice_type, Some(0x0005_0001));

    for alias in &quest.aliases[1..] {
        assert!(alias.alst.is_some());
        assert!(alias.alls.is_none());
    }
    assert_eq!(quest.aliases[3].components.len(), 1);
    assert_eq!(quest.aliases[3].components[0].count, 100);

    assert_eq!(encode(&quest), body);
}

#[test]
fn test_start_marker_checked_on_encode_only() {
    // Decode takes whichever marker opened the block and never checks the
    // pair; encode insists on exactly one.
    let quest = decode(&four_aliases()).unwrap();
    let mut broken = quest.clone();
    broken.aliases[0].alst = Some(9);

    let mut writer = Writer::new(W);
    assert_eq!(
        broken.encode(&mut writer),
        Err(CodecError::AliasStartMarker {
            alst: true,
            alls: true
        })
    );

    broken.aliases[0] = AliasEntry::default();
    let mut writer = Writer::new(W);
    assert_eq!(
        broken.encode(&mut writer),
        Err(CodecError::AliasStartMarker {
            alst: false,
            alls: false
        })
    );
}

#[test]
fn test_condition_compound_in_isolation() {
    let block = condition_block(0x40);
    for (attached, variant) in [
        (None, StringVariant::Cis1),
        (Some("GetIsID"), StringVariant::Cis1),
        (Some("HasPerk"), StringVariant::Cis2),
    ] {
        let compound = match attached {
            Some(text) => ConditionCompound::with_string(block, text),
            None => ConditionCompound::new(block),
        };
        let mut writer = Writer::new(W);
        compound.encode(&mut writer, variant).unwrap();
        let bytes = writer.freeze();
        assert_eq!(&bytes[6..38], &block[..]);

        let mut reader = Reader::new(bytes.clone(), W);
        let decoded = ConditionCompound::decode(&mut reader, variant).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded, compound);

        let mut writer = Writer::new(W);
        decoded.encode(&mut writer, variant).unwrap();
        assert_eq!(writer.freeze(), bytes);
    }
}

#[test]
fn test_stage_entry_before_index() {
    let mut body = head("Order");
    body.extend(sub(b"QSDT", b"\0"));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: QSDT,
            previous: NEXT
        })
    );
}

#[test]
fn test_log_text_before_entry() {
    let mut body = head("Order");
    body.extend(sub(b"INDX", b"\0\0\0\0"));
    body.extend(sub(b"CNAM", b"early\0"));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: CNAM,
            previous: INDX
        })
    );

    let mut body = head("Order");
    body.extend(sub(b"CNAM", b"early\0"));
    assert!(matches!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation { tag, .. }) if tag == CNAM
    ));
}

#[test]
fn test_target_before_objective() {
    let mut body = head("Order");
    body.extend(sub(b"QSTA", &[0u8; 8]));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: QSTA,
            previous: NEXT
        })
    );
}

#[test]
fn test_attached_string_without_condition() {
    let mut body = head("Order");
    body.extend(sub(b"CIS2", b"abc\0"));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: CIS2,
            previous: NEXT
        })
    );

    // Top-level conditions do not carry over into a new stage entry
    let mut body = head("Order");
    body.extend(sub(b"CTDA", &[0u8; 32]));
    body.extend(sub(b"INDX", b"\0\0\0\0"));
    body.extend(sub(b"QSDT", b"\0"));
    body.extend(sub(b"CIS2", b"abc\0"));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: CIS2,
            previous: QSDT
        })
    );
}

#[test]
fn test_two_strings_for_one_condition() {
    let mut body = head("Duplicate");
    body.extend(sub(b"CTDA", &[0u8; 32]));
    body.extend(sub(b"CIS2", b"abc\0"));
    body.extend(sub(b"CIS2", b"def\0"));
    assert_eq!(decode(&body), Err(CodecError::DuplicateSubrecord(CIS2)));
}

#[test]
fn test_condition_after_alias_control() {
    let mut body = head("Order");
    body.extend(sub(b"INDX", b"\0\0\0\0"));
    body.extend(sub(b"QSDT", b"\0"));
    body.extend(u32_sub(b"ANAM", 0));
    body.extend(sub(b"CTDA", &[0u8; 32]));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: CTDA,
            previous: ANAM
        })
    );

    // Same without any stage: conditions after ANAM are never top-level
    let mut body = head("Order");
    body.extend(u32_sub(b"ANAM", 0));
    body.extend(sub(b"CTDA", &[0u8; 32]));
    assert!(matches!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation { tag, .. }) if tag == CTDA
    ));
}

#[test]
fn test_attached_string_after_alias_control() {
    let mut body = head("Order");
    body.extend(sub(b"CTDA", &[0u8; 32]));
    body.extend(u32_sub(b"ANAM", 0));
    body.extend(sub(b"CIS2", b"abc\0"));
    assert_eq!(
        decode(&body),
        Err(CodecError::StructuralOrderViolation {
            tag: CIS2,
            previous: ANAM
        })
    );
}

#[test]
fn test_next_quest_zero_and_nonzero() {
    let stage_with_next = |next: u32| {
        let mut body = head("NextQuest");
        body.extend(sub(b"INDX", b"\x0A\0\0\0"));
        body.extend(sub(b"QSDT", b"\x01"));
        body.extend(u32_sub(b"NAM0", next));
        body.extend(u32_sub(b"ANAM", 0));
        body
    };

    assert_eq!(
        decode(&stage_with_next(0)),
        Err(CodecError::ZeroValueViolation(NAM0))
    );

    let body = stage_with_next(0x0002_0D4F);
    let quest = decode(&body).unwrap();
    let entry = &quest.stage(10).unwrap().entries[0];
    assert_eq!(entry.next_quest, NonZeroU32::new(0x0002_0D4F));
    assert!(entry.is_finisher);
    assert_eq!(encode(&quest), body);
}

#[test]
fn test_condition_wrong_length() {
    let mut body = head("Boundary");
    body.extend(sub(b"CTDA", &[0u8; 31]));
    assert_eq!(
        decode(&body),
        Err(CodecError::InvalidLength {
            tag: CTDA,
            got: 31,
            expected: 32
        })
    );
}

#[test]
fn test_length_past_end_of_stream() {
    let mut body = head("Boundary");
    body.extend_from_slice(b"ANAM\x04\0\0\0");
    assert_eq!(
        decode(&body),
        Err(CodecError::TruncatedStream {
            needed: 4,
            available: 2
        })
    );
}

#[test]
fn test_editor_id_over_cap() {
    let mut text = vec![b'a'; 599];
    text.push(0);
    let mut body = sub(b"EDID", &text);
    body.extend(sub(b"DNAM", &[0u8; 12]));
    body.extend(u32_sub(b"ANAM", 0));
    assert_eq!(
        decode(&body),
        Err(CodecError::LengthOverCap {
            tag: EDID,
            got: 600,
            cap: 511
        })
    );
}

#[test]
fn test_padded_editor_id_is_not_canonical() {
    // One historical writer pads the editor id with extra NUL bytes. The
    // padding is dropped on decode, so re-encoding is shorter.
    let mut body = sub(b"EDID", b"Padded\0\0\0\0");
    body.extend(sub(b"DNAM", &[0u8; 12]));
    body.extend(sub(b"NEXT", b""));
    body.extend(u32_sub(b"ANAM", 0));

    let quest = decode(&body).unwrap();
    assert_eq!(quest.editor_id, "Padded");

    let reencoded = encode(&quest);
    assert_eq!(reencoded.len(), body.len() - 3);
    assert_ne!(reencoded, body);
    assert!(decode(&reencoded).unwrap().structural_equals(&quest));
}

#[test]
fn test_built_quest_round_trip() {
    let mut quest = QuestRecord::new("BuiltInCode");
    quest.display_name = Some(LocalizedText::inline("Built"));
    quest.enable_flag = Some(1);
    quest.target_globals = vec![0x10, 0x11];
    quest.filter = Some("Misc\\".into());
    quest.conditions = vec![
        ConditionCompound::new(condition_block(1)),
        ConditionCompound::with_string(condition_block(2), "Player"),
    ];
    quest.alias_control = 1;
    quest.aliases.push(AliasEntry::reference(0, 0));

    let bytes = encode(&quest);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, quest);
    assert_eq!(Tag::new(*b"QUST"), QuestRecord::TAG);
}
