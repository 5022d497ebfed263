use esmkit_cli::commands::scan;
use esmkit_core::{
    encode_record, GenericRecord, LengthWidth, QuestRecord, Record, RecordHeader, Tag, Writer,
};
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

const W: LengthWidth = LengthWidth::U16;

fn record_bytes(record: &Record, form_id: u32) -> Vec<u8> {
    let mut writer = Writer::new(W);
    encode_record(&mut writer, &RecordHeader::new(record.tag(), form_id), record).unwrap();
    writer.freeze().to_vec()
}

/// Helper: a small plugin with a header record, a group and two quests
fn create_plugin() -> Vec<u8> {
    let tes4 = Record::Generic(GenericRecord::new(Tag::new(*b"TES4"), &b"HEDR"[..]));
    let first = record_bytes(&Record::Quest(QuestRecord::new("MQ101")), 0x10);
    let second = record_bytes(&Record::Quest(QuestRecord::new("MQ102")), 0x11);

    let mut out = record_bytes(&tes4, 0);
    out.extend_from_slice(b"GRUP");
    out.extend_from_slice(&((24 + first.len() + second.len()) as u32).to_le_bytes());
    out.extend_from_slice(b"QUST");
    out.extend_from_slice(&[0u8; 12]);
    out.extend(first);
    out.extend(second);
    out
}

#[test]
fn test_scan_writes_json() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("plugin.esp");
    let output_path = td.path().join("records.json");
    fs::write(&input_path, create_plugin()).unwrap();

    scan::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        false,
        None,
        false,
        W,
    )
    .unwrap();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["tag"], "TES4");
    assert!(records[0]["editor_id"].is_null());
    assert_eq!(records[1]["tag"], "QUST");
    assert_eq!(records[1]["form_id"], 0x10);
    assert_eq!(records[2]["editor_id"], "MQ102");
}

#[test]
fn test_scan_stats_only() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("plugin.esp");
    let output_path = td.path().join("records.json");
    fs::write(&input_path, create_plugin()).unwrap();

    scan::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        true,
        None,
        false,
        W,
    )
    .unwrap();

    assert!(!output_path.exists());
}

#[test]
fn test_scan_damaged_plugin() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("damaged.esp");
    let output_path = td.path().join("records.json");

    let mut data = create_plugin();
    data.extend_from_slice(&[0xAB; 7]);
    fs::write(&input_path, data).unwrap();

    scan::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        false,
        None,
        false,
        W,
    )
    .unwrap();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
}
