//! Localized string tables (`.STRINGS`, `.DLSTRINGS`, `.ILSTRINGS`)
//!
//! A table file is laid out as:
//! 1. Entry count (u32 LE)
//! 2. Data size (u32 LE)
//! 3. Directory: `count` pairs of (string id u32, offset u32), offsets
//!    relative to the start of the data block
//! 4. Data block: NUL-terminated strings, or u32 length prefix + chars + NUL

use crate::error::CodecError;
use crate::Result;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::{Buf, BufMut, BytesMut};
use hashbrown::HashMap;

/// Layout of the strings inside a table file's data block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringTableKind {
    /// `.STRINGS`: plain NUL-terminated strings
    NulTerminated,
    /// `.DLSTRINGS` and `.ILSTRINGS`: u32 length (NUL included) + chars + NUL
    LengthPrefixed,
}

impl StringTableKind {
    /// Guess the kind from a file extension, ignoring case
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "strings" => Some(StringTableKind::NulTerminated),
            "dlstrings" | "ilstrings" => Some(StringTableKind::LengthPrefixed),
            _ => None,
        }
    }
}

/// Key to text lookup table for localized strings
///
/// Key 0 means "no string" on the wire and is never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTable {
    entries: HashMap<u32, String>,
}

impl StringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry; key 0 is ignored
    pub fn insert(&mut self, key: u32, text: impl Into<String>) {
        if key == 0 {
            return;
        }
        self.entries.insert(key, text.into());
    }

    /// Look up the text for `key`
    pub fn get(&self, key: u32) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Check whether `key` is present
    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Remove an entry, returning its text
    pub fn remove(&mut self, key: u32) -> Option<String> {
        self.entries.remove(&key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries sorted by key
    pub fn sorted_entries(&self) -> Vec<(u32, &str)> {
        let mut out: Vec<(u32, &str)> = self
            .entries
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        out.sort_unstable_by_key(|(k, _)| *k);
        out
    }

    /// Parse a table file
    ///
    /// The declared data size is not trusted; the data block is whatever
    /// follows the directory.
    pub fn parse(data: &[u8], kind: StringTableKind) -> Result<Self> {
        let mut buf = data;
        if buf.remaining() < 8 {
            return Err(CodecError::InvalidStringTable(
                "file shorter than its header".to_string(),
            ));
        }
        let count = buf.get_u32_le() as usize;
        let _declared_size = buf.get_u32_le();

        let dir_len = count.checked_mul(8).ok_or_else(|| {
            CodecError::InvalidStringTable(format!("entry count {} is too large", count))
        })?;
        if buf.remaining() < dir_len {
            return Err(CodecError::InvalidStringTable(format!(
                "directory of {} entries is truncated",
                count
            )));
        }

        let mut directory = Vec::with_capacity(count);
        for _ in 0..count {
            let id = buf.get_u32_le();
            let offset = buf.get_u32_le() as usize;
            directory.push((id, offset));
        }
        let block = buf;

        let mut table = StringTable::new();
        for (id, offset) in directory {
            let text = match kind {
                StringTableKind::NulTerminated => read_nul_terminated(block, offset)?,
                StringTableKind::LengthPrefixed => read_length_prefixed(block, offset)?,
            };
            table.insert(id, text);
        }
        Ok(table)
    }

    /// Serialize the table into file form, entries ordered by key
    pub fn to_bytes(&self, kind: StringTableKind) -> Vec<u8> {
        let entries = self.sorted_entries();
        let mut block = BytesMut::new();
        let mut directory = Vec::with_capacity(entries.len());
        for (id, text) in &entries {
            directory.push((*id, block.len() as u32));
            if kind == StringTableKind::LengthPrefixed {
                block.put_u32_le(text.len() as u32 + 1);
            }
            block.put_slice(text.as_bytes());
            block.put_u8(0);
        }

        let mut out = BytesMut::with_capacity(8 + directory.len() * 8 + block.len());
        out.put_u32_le(directory.len() as u32);
        out.put_u32_le(block.len() as u32);
        for (id, offset) in directory {
            out.put_u32_le(id);
            out.put_u32_le(offset);
        }
        out.put_slice(&block);
        out.to_vec()
    }
}

fn text_at(block: &[u8], start: usize, id_offset: usize) -> Result<String> {
    let tail = block.get(start..).ok_or_else(|| {
        CodecError::InvalidStringTable(format!("offset {} is outside the data block", id_offset))
    })?;
    let end = memchr::memchr(0, tail).ok_or_else(|| {
        CodecError::InvalidStringTable(format!("string at offset {} is not terminated", id_offset))
    })?;
    core::str::from_utf8(&tail[..end])
        .map(|s| s.to_string())
        .map_err(|_| {
            CodecError::InvalidStringTable(format!("string at offset {} is not valid text", id_offset))
        })
}

fn read_nul_terminated(block: &[u8], offset: usize) -> Result<String> {
    text_at(block, offset, offset)
}

fn read_length_prefixed(block: &[u8], offset: usize) -> Result<String> {
    let prefix = block.get(offset..offset.saturating_add(4)).ok_or_else(|| {
        CodecError::InvalidStringTable(format!("offset {} is outside the data block", offset))
    })?;
    let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    let start = offset + 4;
    if block.len() < start.saturating_add(len) {
        return Err(CodecError::InvalidStringTable(format!(
            "string at offset {} runs past the data block",
            offset
        )));
    }
    text_at(&block[..start + len], start, offset)
}
