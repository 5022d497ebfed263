use crate::optional_string_table;
use anyhow::{Context, Result};
use colored::*;
use esmkit_core::{
    decode_record, encode_record, DecodeContext, LengthWidth, Reader, Record, StringTable, Writer,
};
use std::fs;
use tracing::{info, warn};

/// Outcome of a decode/re-encode pass over one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Body size declared by the input header
    pub declared_size: u32,

    /// Body size the decoded record would encode to
    pub encoded_size: u32,

    /// Offset of the first byte that differs, if any
    pub first_difference: Option<usize>,

    /// Up to 16 input bytes from the first difference
    pub original_excerpt: Vec<u8>,

    /// Up to 16 re-encoded bytes from the first difference
    pub encoded_excerpt: Vec<u8>,
}

impl VerifyReport {
    /// Whether the record re-encodes byte for byte
    pub fn is_canonical(&self) -> bool {
        self.declared_size == self.encoded_size && self.first_difference.is_none()
    }
}

/// Decode `data` as one record and re-encode it
pub fn check(data: &[u8], ctx: &DecodeContext<'_>, width: LengthWidth) -> Result<VerifyReport> {
    let mut reader = Reader::new(data.to_vec(), width);
    let (header, record) = decode_record(&mut reader, ctx).context("Failed to decode record")?;
    let consumed = reader.consumed();

    let encoded_size = record.encoded_size(width);
    let mut writer = Writer::new(width);
    encode_record(&mut writer, &header, &record).context("Failed to re-encode record")?;
    let encoded = writer.freeze();

    let original = &data[..consumed];
    let first_difference = original
        .iter()
        .zip(encoded.iter())
        .position(|(a, b)| a != b)
        .or_else(|| (original.len() != encoded.len()).then(|| original.len().min(encoded.len())));

    if let (Some(offset), Record::Quest(quest)) = (first_difference, &record) {
        warn!(
            "Quest {} re-encodes differently from offset {}",
            quest.editor_id, offset
        );
    }

    let excerpt = |bytes: &[u8]| -> Vec<u8> {
        match first_difference {
            Some(offset) => bytes[offset.min(bytes.len())..]
                .iter()
                .take(16)
                .copied()
                .collect(),
            None => Vec::new(),
        }
    };

    Ok(VerifyReport {
        declared_size: header.data_size,
        encoded_size,
        first_difference,
        original_excerpt: excerpt(original),
        encoded_excerpt: excerpt(&encoded),
    })
}

pub fn execute(
    input: &str,
    strings: Option<&str>,
    localized: bool,
    width: LengthWidth,
) -> Result<VerifyReport> {
    info!("Verifying file: {}", input);

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;
    let table: StringTable = optional_string_table(strings)?;
    let ctx = DecodeContext::new(localized, &table);

    let report = check(&data, &ctx, width)?;

    println!("\n=== Verification Results ===");
    println!("Declared body size: {} bytes", report.declared_size);
    println!("Encoded body size:  {} bytes", report.encoded_size);

    if report.is_canonical() {
        println!("{} Record re-encodes byte for byte", "✓".green());
    } else {
        match report.first_difference {
            Some(offset) => {
                println!(
                    "{} Re-encoded record differs from offset {}",
                    "✗".red(),
                    offset.to_string().red()
                );
                println!("  input:      {}", hex::encode(&report.original_excerpt));
                println!("  re-encoded: {}", hex::encode(&report.encoded_excerpt));
            }
            None => println!("{} Encoded size differs from the declared size", "✗".red()),
        }
    }

    Ok(report)
}
