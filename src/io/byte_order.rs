//! Byte order handling for TIFF files
//!
//! The byte order is fixed once per file by its two-byte marker. Every
//! multi-byte integer or float decoded afterwards, whether a directory field or
//! a pixel sample, follows it.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Represents the byte order of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian byte order (II)
    LittleEndian,
    /// Big-endian byte order (MM)
    BigEndian,
}

impl ByteOrder {
    /// Detects the byte order from the two marker bytes of the TIFF header
    ///
    /// Both bytes must be identical, either `II` or `MM`.
    pub fn detect(marker: [u8; 2]) -> TiffResult<Self> {
        match marker {
            header::LITTLE_ENDIAN_MARKER => Ok(ByteOrder::LittleEndian),
            header::BIG_ENDIAN_MARKER => Ok(ByteOrder::BigEndian),
            _ => Err(TiffError::InvalidByteOrder(u16::from_be_bytes(marker))),
        }
    }

    /// Returns a string representation of this byte order
    pub fn name(&self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "Little Endian (II)",
            ByteOrder::BigEndian => "Big Endian (MM)",
        }
    }

    /// Decodes a u16 from the first two bytes of `buf`
    #[inline]
    pub fn read_u16(&self, buf: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u16(buf),
            ByteOrder::BigEndian => BigEndian::read_u16(buf),
        }
    }

    /// Decodes a u32 from the first four bytes of `buf`
    #[inline]
    pub fn read_u32(&self, buf: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u32(buf),
            ByteOrder::BigEndian => BigEndian::read_u32(buf),
        }
    }

    /// Decodes a u64 from the first eight bytes of `buf`
    #[inline]
    pub fn read_u64(&self, buf: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_u64(buf),
            ByteOrder::BigEndian => BigEndian::read_u64(buf),
        }
    }

    /// Decodes an i16 from the first two bytes of `buf`
    #[inline]
    pub fn read_i16(&self, buf: &[u8]) -> i16 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_i16(buf),
            ByteOrder::BigEndian => BigEndian::read_i16(buf),
        }
    }

    /// Decodes an i32 from the first four bytes of `buf`
    #[inline]
    pub fn read_i32(&self, buf: &[u8]) -> i32 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_i32(buf),
            ByteOrder::BigEndian => BigEndian::read_i32(buf),
        }
    }

    /// Decodes an i64 from the first eight bytes of `buf`
    #[inline]
    pub fn read_i64(&self, buf: &[u8]) -> i64 {
        match self {
            ByteOrder::LittleEndian => LittleEndian::read_i64(buf),
            ByteOrder::BigEndian => BigEndian::read_i64(buf),
        }
    }

    /// Decodes an unsigned offset or count whose width depends on the variant
    ///
    /// Classic TIFF uses 4 bytes, BigTIFF uses 8.
    #[inline]
    pub fn read_word(&self, buf: &[u8], big_tiff: bool) -> u64 {
        if big_tiff {
            self.read_u64(buf)
        } else {
            self.read_u32(buf) as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_markers() {
        assert_eq!(ByteOrder::detect(*b"II").unwrap(), ByteOrder::LittleEndian);
        assert_eq!(ByteOrder::detect(*b"MM").unwrap(), ByteOrder::BigEndian);
    }

    #[test]
    fn test_detect_rejects_mixed_marker() {
        match ByteOrder::detect(*b"IM") {
            Err(TiffError::InvalidByteOrder(v)) => assert_eq!(v, 0x494D),
            other => panic!("expected InvalidByteOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_decoding_follows_order() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(ByteOrder::LittleEndian.read_u16(&bytes), 0x3412);
        assert_eq!(ByteOrder::BigEndian.read_u16(&bytes), 0x1234);
        assert_eq!(ByteOrder::LittleEndian.read_u32(&bytes), 0x78563412);
        assert_eq!(ByteOrder::BigEndian.read_u64(&bytes), 0x123456789ABCDEF0);
        assert_eq!(ByteOrder::BigEndian.read_word(&bytes, false), 0x12345678);
        assert_eq!(ByteOrder::BigEndian.read_word(&bytes, true), 0x123456789ABCDEF0);
    }
}
