//! Example building a quest in code, encoding it and reading it back

use esmkit_core::{
    decode_record, encode_record,
    quest::{AliasEntry, Objective, StageIndex, StageLogEntry, Target},
    ConditionCompound, DecodeContext, LengthWidth, LocalizedText, QuestRecord, Reader, Record,
    RecordHeader, StringTable, Writer,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Esmkit Quest Building Example\n");

    // Step 1: Describe the quest
    let mut quest = QuestRecord::new("MQ101Demo");
    quest.display_name = Some(LocalizedText::inline("Unbound"));
    quest.filter = Some("Main\\".into());

    let mut start = StageIndex::new(10, 0);
    let mut entry = StageLogEntry::new(false);
    entry.log_text = Some(LocalizedText::inline("I crossed the border."));
    start.entries.push(entry);
    quest.stages.push(start);

    let mut done = StageIndex::new(200, 0);
    let mut entry = StageLogEntry::new(true);
    entry.conditions.push(ConditionCompound::with_string([0u8; 32], "Player"));
    done.entries.push(entry);
    quest.stages.push(done);

    let mut objective = Objective::new(10, 0);
    objective.display_text = Some(LocalizedText::inline("Follow Hadvar"));
    objective.targets.push(Target::new(1));
    quest.objectives.push(objective);

    let mut alias = AliasEntry::reference(0, 0);
    alias.name = Some("Hadvar".into());
    quest.aliases.push(alias);
    quest.alias_control = 1;

    // Step 2: Encode with a record header
    let record = Record::Quest(quest);
    let mut writer = Writer::new(LengthWidth::U16);
    encode_record(&mut writer, &RecordHeader::new(record.tag(), 0x0003_372B), &record)?;
    let bytes = writer.freeze();
    println!("Encoded record: {} bytes", bytes.len());
    println!("Header: {}\n", hex::encode(&bytes[..24]));

    // Step 3: Decode and compare
    let table = StringTable::new();
    let ctx = DecodeContext::inline(&table);
    let mut reader = Reader::new(bytes, LengthWidth::U16);
    let (header, decoded) = decode_record(&mut reader, &ctx)?;

    println!("Decoded {} record {:08X}", header.tag, header.form_id);
    if let Some(quest) = decoded.as_quest() {
        println!("  Editor id:   {}", quest.editor_id);
        println!("  Stages:      {}", quest.stages.len());
        println!("  Objectives:  {}", quest.objectives.len());
        println!("  Aliases:     {}", quest.aliases.len());
    }
    println!("  Round trip:  {}", decoded.structural_equals(&record));

    Ok(())
}
