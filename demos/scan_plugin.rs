//! Example walking a small plugin with one damaged record

use esmkit_core::{
    encode_record, scanner::scan_records, DecodeContext, GenericRecord, LengthWidth, QuestRecord,
    Record, RecordHeader, StringTable, Tag, Writer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Esmkit Plugin Scan Example\n");

    // Step 1: Write a file header record and five quests
    println!("Step 1: Writing records...");
    let mut writer = Writer::new(LengthWidth::U16);
    let tes4 = Record::Generic(GenericRecord::new(Tag::new(*b"TES4"), &b"HEDR"[..]));
    encode_record(&mut writer, &RecordHeader::new(tes4.tag(), 0), &tes4)?;

    let mut offsets = Vec::new();
    for i in 1..=5 {
        offsets.push(writer.len());
        let quest = Record::Quest(QuestRecord::new(format!("DemoQuest{:02}", i)));
        encode_record(&mut writer, &RecordHeader::new(quest.tag(), 0x100 + i), &quest)?;
    }
    let mut plugin = writer.freeze().to_vec();
    println!("Plugin: {} bytes\n", plugin.len());

    // Step 2: Damage the third quest's EDID tag
    println!("Step 2: Simulating damage...");
    let edid = offsets[2] + 24;
    plugin[edid..edid + 4].copy_from_slice(b"XXXX");
    println!("Overwrote bytes {}-{}\n", edid, edid + 4);

    // Step 3: Scan
    println!("Step 3: Scanning...");
    let table = StringTable::new();
    let ctx = DecodeContext::inline(&table);
    let (records, stats) = scan_records(&plugin, LengthWidth::U16, &ctx);

    println!("Scan Results:");
    println!("  Bytes scanned:     {}", stats.bytes_scanned);
    println!("  Records found:     {}", stats.records_found);
    println!("  Quests decoded:    {}", stats.quests_decoded);
    println!("  Decode failures:   {}", stats.decode_failures);
    println!("  Recovery rate:     {:.1}%\n", stats.recovery_rate());

    for located in &records {
        let name = located
            .record
            .as_quest()
            .map(|q| q.editor_id.as_str())
            .unwrap_or("-");
        println!("  @{:>6}  {}  {:08X}  {}", located.offset, located.header.tag, located.header.form_id, name);
    }

    Ok(())
}
