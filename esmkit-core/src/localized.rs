//! Localized text: an inline string, or a key into an external string table

use crate::constants::LengthWidth;
use crate::cursor::Writer;
use crate::error::CodecError;
use crate::fields::{read_text, read_u32, text_size, u32_size, write_text, write_u32};
use crate::subrecord::Subrecord;
use crate::types::{DecodeContext, Tag};
use crate::Result;
use alloc::string::{String, ToString};
use serde::{Deserialize, Serialize};

/// Text stored either inline or as a string table key
///
/// Which form a subrecord uses is decided by the file's localized flag,
/// not by the subrecord itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalizedText {
    /// String table key; `text` is the resolved value
    Index {
        /// Key into the string table
        key: u32,
        /// Text the key resolved to at decode time (empty for key 0)
        text: String,
    },
    /// Inline NUL-terminated text
    Inline(String),
}

impl LocalizedText {
    /// Indexed text with its resolved value
    pub fn index(key: u32, text: impl Into<String>) -> Self {
        LocalizedText::Index {
            key,
            text: text.into(),
        }
    }

    /// Inline text
    pub fn inline(text: impl Into<String>) -> Self {
        LocalizedText::Inline(text.into())
    }

    /// Decode a localized subrecord
    ///
    /// Key 0 stands for "no text" and is not looked up. Any other key must
    /// exist in the context's string table.
    pub fn decode(sub: &Subrecord, ctx: &DecodeContext<'_>) -> Result<Self> {
        if !ctx.localized {
            return read_text(sub).map(LocalizedText::Inline);
        }
        let key = read_u32(sub)?;
        if key == 0 {
            return Ok(LocalizedText::index(0, String::new()));
        }
        let text = ctx
            .strings
            .get(key)
            .ok_or(CodecError::UnknownStringKey(key))?;
        Ok(LocalizedText::index(key, text.to_string()))
    }

    /// Write as a subrecord with the given tag
    pub fn encode(&self, writer: &mut Writer, tag: Tag) -> Result<()> {
        match self {
            LocalizedText::Index { key, .. } => write_u32(writer, tag, *key),
            LocalizedText::Inline(text) => write_text(writer, tag, text),
        }
    }

    /// On-wire size including tag and length prefix
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        match self {
            LocalizedText::Index { .. } => u32_size(width),
            LocalizedText::Inline(text) => text_size(width, text),
        }
    }

    /// The text, resolved or inline
    pub fn text(&self) -> &str {
        match self {
            LocalizedText::Index { text, .. } => text,
            LocalizedText::Inline(text) => text,
        }
    }

    /// True for the string table form
    pub fn is_index(&self) -> bool {
        matches!(self, LocalizedText::Index { .. })
    }
}

impl PartialEq for LocalizedText {
    // Keys identify indexed text; the resolved value depends on the table
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LocalizedText::Index { key: a, .. }, LocalizedText::Index { key: b, .. }) => a == b,
            (LocalizedText::Inline(a), LocalizedText::Inline(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for LocalizedText {}
