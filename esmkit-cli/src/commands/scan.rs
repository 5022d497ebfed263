use crate::optional_string_table;
use anyhow::{Context, Result};
use esmkit_core::{scanner::scan_records, DecodeContext, LengthWidth, Record};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::info;

#[derive(Serialize, Deserialize)]
struct RecoveredRecord {
    offset: usize,
    tag: String,
    form_id: u32,
    size: usize,
    editor_id: Option<String>,
    stages: usize,
    objectives: usize,
    aliases: usize,
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    stats_only: bool,
    strings: Option<&str>,
    localized: bool,
    width: LengthWidth,
) -> Result<()> {
    info!("Scanning file: {}", input);

    // Read input file
    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;

    info!("File size: {} bytes", data.len());

    let table = optional_string_table(strings)?;
    let ctx = DecodeContext::new(localized, &table);

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Scanning {} bytes", data.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let (located, stats) = scan_records(&data, width, &ctx);

    spinner.finish_and_clear();

    // Print statistics
    println!("\n=== Scan Results ===");
    println!("Bytes scanned:     {} bytes", stats.bytes_scanned);
    println!("Groups entered:    {}", stats.groups_entered);
    println!("Records decoded:   {}", stats.records_found);
    println!("Quests decoded:    {}", stats.quests_decoded);
    println!("Decode failures:   {}", stats.decode_failures);
    println!("Bytes recovered:   {} bytes", stats.bytes_recovered);
    println!("Recovery rate:     {:.2}%", stats.recovery_rate());
    println!();

    if stats_only {
        return Ok(());
    }

    let recovered: Vec<RecoveredRecord> = located
        .iter()
        .map(|lr| {
            let quest = match &lr.record {
                Record::Quest(quest) => Some(quest),
                Record::Generic(_) => None,
            };
            RecoveredRecord {
                offset: lr.offset,
                tag: lr.header.tag.to_string(),
                form_id: lr.header.form_id,
                size: lr.size,
                editor_id: quest.map(|q| q.editor_id.clone()),
                stages: quest.map_or(0, |q| q.stages.len()),
                objectives: quest.map_or(0, |q| q.objectives.len()),
                aliases: quest.map_or(0, |q| q.aliases.len()),
            }
        })
        .collect();

    if let Some(output_path) = output {
        // Write to JSON file
        let json = serde_json::to_string_pretty(&recovered)
            .with_context(|| "Failed to serialize recovered records")?;

        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        info!("Recovered records written to: {}", output_path);
    } else {
        println!("=== Recovered Records ===");
        for record in &recovered {
            match &record.editor_id {
                Some(editor_id) => println!(
                    "{} {:08X} @ offset {}: {} ({} stages, {} objectives, {} aliases)",
                    record.tag,
                    record.form_id,
                    record.offset,
                    editor_id,
                    record.stages,
                    record.objectives,
                    record.aliases
                ),
                None => println!(
                    "{} {:08X} @ offset {}: {} bytes",
                    record.tag, record.form_id, record.offset, record.size
                ),
            }
        }
    }

    Ok(())
}
