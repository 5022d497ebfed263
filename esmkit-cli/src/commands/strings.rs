use crate::load_string_table;
use anyhow::Result;
use colored::*;
use esmkit_core::StringTableKind;
use tracing::info;

pub fn execute(input: &str, kind: Option<StringTableKind>) -> Result<()> {
    info!("Reading string table: {}", input);

    let table = load_string_table(input, kind)?;

    println!("\n=== String Table ===");
    println!("Entries:           {}", table.len());
    println!();

    if table.is_empty() {
        println!("{} No strings found", "✗".red());
        return Ok(());
    }

    for (key, text) in table.sorted_entries() {
        println!("{:08X}  {}", key, text);
    }

    Ok(())
}
