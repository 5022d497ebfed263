//! Fuzzing entry points for esmkit-core decoders
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Wrap an entry point in a fuzz target and run: cargo fuzz run <target>

use esmkit_core::{DecodeContext, LengthWidth, StringTable};

/// The first input byte picks the length width and the localized flag
fn split_options(data: &[u8]) -> (LengthWidth, bool, &[u8]) {
    match data.split_first() {
        Some((&options, rest)) => {
            let width = if options & 1 == 0 {
                LengthWidth::U16
            } else {
                LengthWidth::U32
            };
            (width, options & 2 != 0, rest)
        }
        None => (LengthWidth::U16, false, data),
    }
}

fn string_table() -> StringTable {
    let mut table = StringTable::new();
    table.insert(1, "one");
    table.insert(0xAD7, "foo");
    table
}

pub fn fuzz_decode_quest(data: &[u8]) {
    use esmkit_core::{QuestRecord, Reader, RecordCodec};

    let (width, localized, body) = split_options(data);
    let table = string_table();
    let ctx = DecodeContext::new(localized, &table);
    let mut reader = Reader::new(body.to_vec(), width);

    // Try to decode - should never panic
    let _ = QuestRecord::decode(&mut reader, &ctx);
}

pub fn fuzz_decode_record(data: &[u8]) {
    use esmkit_core::{decode_record, encode_record, Reader, Writer};

    let (width, localized, bytes) = split_options(data);
    let table = string_table();
    let ctx = DecodeContext::new(localized, &table);
    let mut reader = Reader::new(bytes.to_vec(), width);

    // Whatever decodes must encode to exactly its reported size
    if let Ok((header, record)) = decode_record(&mut reader, &ctx) {
        let mut writer = Writer::new(width);
        if encode_record(&mut writer, &header, &record).is_ok() {
            assert_eq!(
                writer.len(),
                24 + record.encoded_size(width) as usize,
                "encoded size mismatch"
            );
        }
    }
}

pub fn fuzz_scan(data: &[u8]) {
    use esmkit_core::scanner::scan_records;

    let (width, localized, bytes) = split_options(data);
    let table = string_table();
    let ctx = DecodeContext::new(localized, &table);

    // Try to scan - should never panic
    let _ = scan_records(bytes, width, &ctx);
}

pub fn fuzz_string_table(data: &[u8]) {
    use esmkit_core::StringTableKind;

    for kind in [StringTableKind::NulTerminated, StringTableKind::LengthPrefixed] {
        let _ = StringTable::parse(data, kind);
    }
}
