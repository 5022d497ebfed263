//! # Esmkit Core
//!
//! Decoding and encoding of records stored in the tag-length-value container
//! format used by ESM/ESP game-data files.
//!
//! ## Modules
//!
//! - `constants`: Subrecord tags, size limits and record flags
//! - `types`: Core types (Tag, DecodeContext, RecordCodec)
//! - `cursor`: Forward-only byte reader and writer
//! - `subrecord`: Framing of one (tag, length, payload) unit
//! - `fields`: Typed field codecs built on the framing layer
//! - `string_table`: Localized string tables
//! - `localized`: Localized text (inline or string table key)
//! - `condition`: CTDA condition + attached CIS string compound
//! - `record`: Record header and the closed set of record variants
//! - `quest`: Quest record state machine and its sub-entities
//! - `scanner`: Record stream walking with statistics

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod condition;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod fields;
pub mod localized;
pub mod quest;
pub mod record;
pub mod scanner;
pub mod string_table;
pub mod subrecord;
pub mod types;

// Re-export commonly used types
pub use condition::{ConditionCompound, StringVariant};
pub use constants::LengthWidth;
pub use cursor::{Reader, Writer};
pub use error::CodecError;
pub use localized::LocalizedText;
pub use quest::QuestRecord;
pub use record::{decode_record, encode_record, GenericRecord, Record, RecordHeader};
pub use string_table::{StringTable, StringTableKind};
pub use types::{DecodeContext, RecordCodec, Tag};

/// Result type alias for Esmkit operations
pub type Result<T> = core::result::Result<T, CodecError>;
