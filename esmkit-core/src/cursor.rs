//! Forward-only byte cursor over a record stream

use crate::constants::LengthWidth;
use crate::error::CodecError;
use crate::types::Tag;
use crate::Result;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Forward-only reader over an in-memory byte sequence
///
/// Tracks how many bytes have been consumed. Every read checks the remaining
/// length first and fails with `TruncatedStream` instead of panicking.
#[derive(Debug, Clone)]
pub struct Reader {
    buf: Bytes,
    consumed: usize,
    width: LengthWidth,
}

impl Reader {
    /// Create a reader over `data` using the given length-prefix width
    pub fn new(data: impl Into<Bytes>, width: LengthWidth) -> Self {
        Self {
            buf: data.into(),
            consumed: 0,
            width,
        }
    }

    /// Length-prefix width in effect
    pub fn width(&self) -> LengthWidth {
        self.width
    }

    /// Number of bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of bytes left
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Fail unless at least `needed` bytes remain
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if self.buf.len() < needed {
            return Err(CodecError::TruncatedStream {
                needed,
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Split off the next `len` bytes without copying
    pub fn take(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        self.consumed += len;
        Ok(self.buf.split_to(len))
    }

    /// Split off the next `len` bytes as a reader with the same width
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader> {
        let data = self.take(len)?;
        Ok(Reader::new(data, self.width))
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Read a four-byte tag
    pub fn read_tag(&mut self) -> Result<Tag> {
        self.ensure(4)?;
        let mut raw = [0u8; 4];
        self.buf.copy_to_slice(&mut raw);
        self.consumed += 4;
        Ok(Tag::new(raw))
    }

    /// Look at the next tag without consuming it
    pub fn peek_tag(&self) -> Option<Tag> {
        let raw: [u8; 4] = self.buf.get(..4)?.try_into().ok()?;
        Some(Tag::new(raw))
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    /// Read a little-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        self.consumed += 2;
        Ok(self.buf.get_u16_le())
    }

    /// Read a little-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        self.consumed += 4;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian u64
    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        self.consumed += 8;
        Ok(self.buf.get_u64_le())
    }

    /// Read a subrecord length prefix of the active width
    pub fn read_length(&mut self) -> Result<usize> {
        match self.width {
            LengthWidth::U16 => self.read_u16().map(usize::from),
            LengthWidth::U32 => self.read_u32().map(|len| len as usize),
        }
    }
}

/// Append-only writer producing a record stream
#[derive(Debug, Clone)]
pub struct Writer {
    buf: BytesMut,
    width: LengthWidth,
}

impl Writer {
    /// Create an empty writer using the given length-prefix width
    pub fn new(width: LengthWidth) -> Self {
        Self {
            buf: BytesMut::new(),
            width,
        }
    }

    /// Create a writer with preallocated capacity
    pub fn with_capacity(width: LengthWidth, capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            width,
        }
    }

    /// Length-prefix width in effect
    pub fn width(&self) -> LengthWidth {
        self.width
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a tag
    pub fn put_tag(&mut self, tag: Tag) {
        self.buf.put_slice(tag.as_bytes());
    }

    /// Write a subrecord length prefix, checking it fits the active width
    pub fn put_length(&mut self, tag: Tag, len: usize) -> Result<()> {
        let max = self.width.max_payload();
        if len > max {
            return Err(CodecError::PayloadTooLarge { tag, len, max });
        }
        match self.width {
            LengthWidth::U16 => self.buf.put_u16_le(len as u16),
            LengthWidth::U32 => self.buf.put_u32_le(len as u32),
        }
        Ok(())
    }

    /// Write one byte
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Write a little-endian u16
    pub fn put_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    /// Write a little-endian u32
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Write a little-endian u64
    pub fn put_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    /// Write raw bytes
    pub fn put_slice(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finish writing and return the bytes
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
