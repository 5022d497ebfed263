//! Error types for Esmkit operations

use crate::types::{Tag, TagList};
use alloc::string::String;

/// Errors that can occur while decoding or encoding records
///
/// Every decode step stops at the first error; no partially decoded value is
/// ever returned alongside one.
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// A subrecord tag that is not allowed at this position
    #[cfg_attr(feature = "std", error("Unexpected subrecord {found}, expected one of: {allowed}"))]
    UnexpectedTag {
        /// The tag that was read.
        found: Tag,
        /// The tags allowed at this position.
        allowed: TagList,
    },

    /// A singular subrecord appeared more than once
    #[cfg_attr(feature = "std", error("Subrecord {0} occurs more than once"))]
    DuplicateSubrecord(Tag),

    /// A fixed-size subrecord declared the wrong length
    #[cfg_attr(feature = "std", error("Subrecord {tag} has invalid length {got}, expected {expected}"))]
    InvalidLength {
        /// The subrecord tag.
        tag: Tag,
        /// The declared length.
        got: usize,
        /// The required length.
        expected: usize,
    },

    /// The stream ended before the declared number of bytes
    #[cfg_attr(feature = "std", error("Stream truncated: needed {needed} bytes, {available} available"))]
    TruncatedStream {
        /// Bytes required by the current read.
        needed: usize,
        /// Bytes left in the stream.
        available: usize,
    },

    /// A required subrecord never appeared
    #[cfg_attr(feature = "std", error("Missing required field {0}"))]
    MissingRequiredField(&'static str),

    /// A subrecord appeared outside the block it belongs to
    #[cfg_attr(feature = "std", error("Subrecord {tag} is not allowed here (previous subrecord: {previous})"))]
    StructuralOrderViolation {
        /// The misplaced subrecord.
        tag: Tag,
        /// The last subrecord read before it.
        previous: Tag,
    },

    /// A field whose wire value must not be zero was zero
    #[cfg_attr(feature = "std", error("Subrecord {0} must not be zero"))]
    ZeroValueViolation(Tag),

    /// A capped subrecord is longer than its cap
    #[cfg_attr(feature = "std", error("Subrecord {tag} has length {got}, limit is {cap}"))]
    LengthOverCap {
        /// The subrecord tag.
        tag: Tag,
        /// The declared length.
        got: usize,
        /// The cap.
        cap: usize,
    },

    /// A text subrecord that must carry content is empty
    #[cfg_attr(feature = "std", error("Subrecord {0} holds an empty string"))]
    EmptyText(Tag),

    /// A text subrecord is not valid UTF-8
    #[cfg_attr(feature = "std", error("Subrecord {0} holds invalid text"))]
    InvalidText(Tag),

    /// A localized string key has no entry in the string table
    #[cfg_attr(feature = "std", error("String table has no entry for key {0:#x}"))]
    UnknownStringKey(u32),

    /// An alias entry must carry exactly one of ALST and ALLS
    #[cfg_attr(feature = "std", error("Alias entry needs exactly one start marker (ALST set: {alst}, ALLS set: {alls})"))]
    AliasStartMarker {
        /// Whether ALST is set.
        alst: bool,
        /// Whether ALLS is set.
        alls: bool,
    },

    /// A payload does not fit the active length prefix
    #[cfg_attr(feature = "std", error("Payload of {tag} is {len} bytes, maximum is {max}"))]
    PayloadTooLarge {
        /// The subrecord tag.
        tag: Tag,
        /// The payload length.
        len: usize,
        /// The largest length the prefix can express.
        max: usize,
    },

    /// The record body is compressed
    #[cfg_attr(feature = "std", error("Record {0} is compressed"))]
    CompressedRecord(Tag),

    /// Malformed string table file
    #[cfg_attr(feature = "std", error("Invalid string table: {0}"))]
    InvalidStringTable(String),

    /// IO error during read/write
    #[cfg_attr(feature = "std", error("IO error: {0}"))]
    Io(String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}
