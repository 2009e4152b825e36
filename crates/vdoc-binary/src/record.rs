//! Record tags and primitive wire encoding.
//!
//! All multi-byte integers are big-endian. Strings are a `u32` length
//! followed by UTF-8 bytes. Coordinates are 32-bit signed integers below
//! format version 2.0 and `f64` bit patterns from 2.0 on.

use vdoc_model::Version;

use crate::error::{BinaryError, Result};

/// Stream magic, also used for format detection.
pub const MAGIC: &[u8; 4] = b"VDRW";

/// Fixed header length: magic, major, minor, settings mode, reserved.
pub const HEADER_LEN: usize = 8;

pub const TAG_GROUP_BEGIN: u8 = 0x01;
pub const TAG_GROUP_END: u8 = 0x02;
pub const TAG_DESCRIPTION: u8 = 0x03;
pub const TAG_PATH: u8 = 0x10;
pub const TAG_TEXT: u8 = 0x11;
pub const TAG_IMAGE: u8 = 0x12;
pub const TAG_SETTINGS: u8 = 0x20;
pub const TAG_END: u8 = 0xFF;

/// Attribute flag bits (attrs blocks exist from version 1.1).
pub const ATTR_TAG: u8 = 0b0000_0001;
pub const ATTR_FLOW: u8 = 0b0000_0010;

/// Paper descriptor tags inside a settings record.
pub const PAPER_ABSENT: u8 = 0;
pub const PAPER_NAMED: u8 = 1;
pub const PAPER_CUSTOM: u8 = 2;

/// Sequential reader over a fully-buffered stream, tracking the byte
/// offset for error reporting.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset from the start of the stream.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take `len` bytes, failing at the current offset when the stream is
    /// truncated.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = self
            .data
            .get(self.pos..self.pos.checked_add(len).unwrap_or(usize::MAX))
            .ok_or_else(|| {
                BinaryError::invalid_format(self.pos, format!("truncated record: {len} bytes expected"))
            })?;
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(f64::from_be_bytes(buf))
    }

    /// Read one coordinate using the version's numeric encoding.
    pub fn read_coord(&mut self, version: Version) -> Result<f64> {
        if version.supports_float_coords() {
            self.read_f64()
        } else {
            Ok(f64::from(self.read_i32()?))
        }
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        if len > self.remaining() {
            return Err(BinaryError::invalid_format(
                start,
                format!("string length {len} exceeds remaining stream"),
            ));
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            BinaryError::invalid_format_caused_by(start, "string is not valid UTF-8", e)
        })
    }

    /// Read a length-prefixed opaque byte payload.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        if len > self.remaining() {
            return Err(BinaryError::invalid_format(
                start,
                format!("payload length {len} exceeds remaining stream"),
            ));
        }
        Ok(self.take(len)?.to_vec())
    }
}

/// Growable record buffer for encoding.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write one coordinate using the version's numeric encoding. Values
    /// are rounded when the target stores 32-bit integers.
    pub fn put_coord(&mut self, value: f64, version: Version) -> Result<()> {
        if version.supports_float_coords() {
            self.put_f64(value);
        } else {
            let rounded = value.round();
            if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) || !rounded.is_finite()
            {
                return Err(BinaryError::CoordinateRange { value });
            }
            self.buf.extend_from_slice(&(rounded as i32).to_be_bytes());
        }
        Ok(())
    }

    pub fn put_string(&mut self, value: &str) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn put_bytes(&mut self, value: &[u8]) {
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value);
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_roundtrip() {
        let mut enc = Encoder::new();
        enc.put_u8(0x10);
        enc.put_u32(1234);
        enc.put_string("héllo");
        enc.put_bytes(&[1, 2, 3]);
        let buf = enc.finish();

        let mut dec = Decoder::new(&buf);
        assert_eq!(dec.read_u8().unwrap(), 0x10);
        assert_eq!(dec.read_u32().unwrap(), 1234);
        assert_eq!(dec.read_string().unwrap(), "héllo");
        assert_eq!(dec.read_bytes().unwrap(), vec![1, 2, 3]);
        assert!(dec.is_at_end());
    }

    #[test]
    fn test_coord_encoding_per_version() {
        let old = Version::new(1, 5);
        let new = Version::new(2, 0);

        let mut enc = Encoder::new();
        enc.put_coord(10.6, old).unwrap();
        enc.put_coord(10.6, new).unwrap();
        let buf = enc.finish();
        assert_eq!(buf.len(), 4 + 8);

        let mut dec = Decoder::new(&buf);
        assert_eq!(dec.read_coord(old).unwrap(), 11.0); // rounded
        assert_eq!(dec.read_coord(new).unwrap(), 10.6);
    }

    #[test]
    fn test_coord_out_of_range() {
        let mut enc = Encoder::new();
        let err = enc.put_coord(3e10, Version::new(1, 0)).unwrap_err();
        assert!(matches!(err, BinaryError::CoordinateRange { .. }));
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let buf = [0u8, 0, 0, 9, b'a'];
        let mut dec = Decoder::new(&buf);
        let err = dec.read_string().unwrap_err();
        assert_eq!(err.offset(), Some(0));
    }
}
