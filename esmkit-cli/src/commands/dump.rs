use crate::optional_string_table;
use anyhow::{Context, Result};
use colored::*;
use esmkit_core::{decode_record, DecodeContext, LengthWidth, Reader, Record, RecordHeader};
use serde::Serialize;
use std::fs;
use tracing::{info, warn};

#[derive(Serialize)]
struct DumpedRecord<'a> {
    header: &'a RecordHeader,
    record: &'a Record,
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    strings: Option<&str>,
    localized: bool,
    width: LengthWidth,
) -> Result<()> {
    info!("Dumping record from: {}", input);

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    let table = optional_string_table(strings)?;
    let ctx = DecodeContext::new(localized, &table);

    let mut reader = Reader::new(data, width);
    let (header, record) = decode_record(&mut reader, &ctx)
        .with_context(|| format!("Failed to decode record in {}", input))?;

    if !reader.is_empty() {
        warn!("{} trailing bytes after the record were ignored", reader.remaining());
    }

    let json = serde_json::to_string_pretty(&DumpedRecord {
        header: &header,
        record: &record,
    })
    .with_context(|| "Failed to serialize record")?;

    if let Some(output_path) = output {
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;

        println!(
            "{} {} record {:08X} written to {}",
            "✓".green(),
            header.tag,
            header.form_id,
            output_path
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}
