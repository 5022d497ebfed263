//! Library entry for esmkit-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use esmkit_core::{LengthWidth, StringTable, StringTableKind};
use std::fs;
use std::path::Path;
use tracing::info;

/// Subrecord length-prefix width as given on the command line
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum Width {
    /// Two-byte lengths (later-era files)
    U16,
    /// Four-byte lengths (earlier-era files)
    U32,
}

impl From<Width> for LengthWidth {
    fn from(width: Width) -> Self {
        match width {
            Width::U16 => LengthWidth::U16,
            Width::U32 => LengthWidth::U32,
        }
    }
}

/// String table layout as given on the command line
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum TableKind {
    /// NUL-terminated strings (`.STRINGS`)
    Strings,
    /// Length-prefixed strings (`.DLSTRINGS`, `.ILSTRINGS`)
    Dlstrings,
}

impl From<TableKind> for StringTableKind {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Strings => StringTableKind::NulTerminated,
            TableKind::Dlstrings => StringTableKind::LengthPrefixed,
        }
    }
}

/// Read a string table file, picking the layout from `kind` or the extension
pub fn load_string_table(path: &str, kind: Option<StringTableKind>) -> Result<StringTable> {
    let kind = match kind {
        Some(kind) => kind,
        None => Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(StringTableKind::from_extension)
            .with_context(|| format!("Cannot tell the string table kind of {}", path))?,
    };

    let data =
        fs::read(path).with_context(|| format!("Failed to read string table: {}", path))?;
    let table = StringTable::parse(&data, kind)
        .with_context(|| format!("Failed to parse string table: {}", path))?;

    info!("Loaded {} strings from {}", table.len(), path);
    Ok(table)
}

/// The caller's string table, or an empty one
pub fn optional_string_table(path: Option<&str>) -> Result<StringTable> {
    match path {
        Some(path) => load_string_table(path, None),
        None => Ok(StringTable::new()),
    }
}
