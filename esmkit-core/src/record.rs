//! Record header and the closed set of record variants

use crate::constants::{LengthWidth, RecordFlags, QUST, RECORD_HEADER_SIZE};
use crate::cursor::{Reader, Writer};
use crate::error::CodecError;
use crate::quest::QuestRecord;
use crate::types::{DecodeContext, RecordCodec, Tag};
use crate::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// The 24-byte header in front of every record body
///
/// Layout (little-endian):
/// 1. Tag (4 bytes)
/// 2. Body size (4 bytes), excluding this header
/// 3. Flags (4 bytes)
/// 4. Form id (4 bytes)
/// 5. Revision (4 bytes)
/// 6. Version (2 bytes)
/// 7. Unknown (2 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Record type
    pub tag: Tag,

    /// Body size in bytes
    pub data_size: u32,

    /// Record flags
    pub flags: RecordFlags,

    /// Form id
    pub form_id: u32,

    /// Version control revision
    pub revision: u32,

    /// Record format version
    pub version: u16,

    /// Unknown trailing field, preserved as read
    pub unknown: u16,
}

impl RecordHeader {
    /// Header for a record of the given type and form id
    pub fn new(tag: Tag, form_id: u32) -> Self {
        Self {
            tag,
            form_id,
            ..Default::default()
        }
    }

    /// Read a header
    pub fn read(reader: &mut Reader) -> Result<Self> {
        reader.ensure(RECORD_HEADER_SIZE)?;
        Ok(Self {
            tag: reader.read_tag()?,
            data_size: reader.read_u32()?,
            flags: RecordFlags::new(reader.read_u32()?),
            form_id: reader.read_u32()?,
            revision: reader.read_u32()?,
            version: reader.read_u16()?,
            unknown: reader.read_u16()?,
        })
    }

    /// Write the header as-is
    pub fn write(&self, writer: &mut Writer) {
        writer.put_tag(self.tag);
        writer.put_u32(self.data_size);
        writer.put_u32(self.flags.as_u32());
        writer.put_u32(self.form_id);
        writer.put_u32(self.revision);
        writer.put_u16(self.version);
        writer.put_u16(self.unknown);
    }

    /// Header plus body size
    pub fn total_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.data_size as usize
    }
}

/// An opaque record body kept as owned bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRecord {
    /// Record type
    pub tag: Tag,

    /// Raw body
    pub data: Bytes,
}

impl GenericRecord {
    /// Wrap a raw body
    pub fn new(tag: Tag, data: impl Into<Bytes>) -> Self {
        Self {
            tag,
            data: data.into(),
        }
    }

    /// Take the rest of `reader` as the body
    pub fn decode(tag: Tag, reader: &mut Reader) -> Result<Self> {
        let data = reader.take(reader.remaining())?;
        Ok(Self { tag, data })
    }

    /// Write the body bytes
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        writer.put_slice(&self.data);
        Ok(())
    }

    /// Body size in bytes
    pub fn encoded_size(&self, _width: LengthWidth) -> u32 {
        u32::try_from(self.data.len()).unwrap_or(u32::MAX)
    }
}

/// Every record type this crate knows about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    /// QUST
    Quest(QuestRecord),

    /// Anything else, kept opaque
    Generic(GenericRecord),
}

impl Record {
    /// Record type
    pub fn tag(&self) -> Tag {
        match self {
            Record::Quest(_) => QuestRecord::TAG,
            Record::Generic(generic) => generic.tag,
        }
    }

    /// Decode a body of the given type
    pub fn decode(tag: Tag, reader: &mut Reader, ctx: &DecodeContext<'_>) -> Result<Self> {
        match tag {
            QUST => QuestRecord::decode(reader, ctx).map(Record::Quest),
            _ => GenericRecord::decode(tag, reader).map(Record::Generic),
        }
    }

    /// Encode the body
    pub fn encode(&self, writer: &mut Writer) -> Result<()> {
        match self {
            Record::Quest(quest) => quest.encode(writer),
            Record::Generic(generic) => generic.encode(writer),
        }
    }

    /// Body size `encode` would write
    pub fn encoded_size(&self, width: LengthWidth) -> u32 {
        match self {
            Record::Quest(quest) => quest.encoded_size(width),
            Record::Generic(generic) => generic.encoded_size(width),
        }
    }

    /// Compare bodies by content
    pub fn structural_equals(&self, other: &Record) -> bool {
        match (self, other) {
            (Record::Quest(a), Record::Quest(b)) => a.structural_equals(b),
            (Record::Generic(a), Record::Generic(b)) => a == b,
            _ => false,
        }
    }

    /// The quest body, if this is one
    pub fn as_quest(&self) -> Option<&QuestRecord> {
        match self {
            Record::Quest(quest) => Some(quest),
            Record::Generic(_) => None,
        }
    }
}

/// Decode one record (header and body)
///
/// The body is limited to the header's declared size; subrecords that run
/// past it fail as truncated.
pub fn decode_record(reader: &mut Reader, ctx: &DecodeContext<'_>) -> Result<(RecordHeader, Record)> {
    let header = RecordHeader::read(reader)?;
    let mut body = reader.sub_reader(header.data_size as usize)?;

    #[cfg(feature = "logging")]
    debug!(
        "Record {} form {:08X}: {} body bytes",
        header.tag, header.form_id, header.data_size
    );

    let record = match header.tag {
        QUST if header.flags.is_compressed() => {
            #[cfg(feature = "logging")]
            warn!("Compressed {} record {:08X} not supported", header.tag, header.form_id);
            return Err(CodecError::CompressedRecord(header.tag));
        }
        tag => Record::decode(tag, &mut body, ctx)?,
    };

    Ok((header, record))
}

/// Encode one record
///
/// The header's `tag` and `data_size` are taken from `record`; the other
/// header fields are written as given. The body is built aside first, so
/// `writer` is left untouched when encoding fails.
pub fn encode_record(writer: &mut Writer, header: &RecordHeader, record: &Record) -> Result<()> {
    let tag = record.tag();
    let expected = record.encoded_size(writer.width());

    let mut body = Writer::new(writer.width());
    record.encode(&mut body)?;
    let data_size = u32::try_from(body.len()).map_err(|_| CodecError::PayloadTooLarge {
        tag,
        len: body.len(),
        max: u32::MAX as usize,
    })?;
    if data_size != expected {
        return Err(CodecError::InvalidLength {
            tag,
            got: body.len(),
            expected: expected as usize,
        });
    }

    let header = RecordHeader {
        tag,
        data_size,
        ..*header
    };
    header.write(writer);
    writer.put_slice(body.as_slice());
    Ok(())
}
