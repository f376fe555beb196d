//! Core TIFF data structures

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, sample_format};
use crate::tiff::errors::{TiffError, TiffResult};

/// Container variant and byte order, fixed once per opened stream
///
/// Every count, offset and inline value slot width derives from `big_tiff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFormat {
    /// Whether this is the 64-bit BigTIFF variant
    pub big_tiff: bool,
    /// Byte order of all multi-byte values
    pub byte_order: ByteOrder,
}

impl FileFormat {
    pub fn new(big_tiff: bool, byte_order: ByteOrder) -> Self {
        FileFormat { big_tiff, byte_order }
    }

    /// Size of the entry count at the start of a directory
    pub fn count_size(&self) -> usize {
        if self.big_tiff { 8 } else { 2 }
    }

    /// Size of one directory entry
    pub fn entry_size(&self) -> usize {
        if self.big_tiff { 20 } else { 12 }
    }

    /// Size of offsets, entry counts and the inline value slot
    pub fn word_size(&self) -> usize {
        if self.big_tiff { 8 } else { 4 }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", if self.big_tiff { "BigTIFF" } else { "TIFF" }, self.byte_order.name())
    }
}

/// Data type of a directory entry's values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Ifd,
    Ifd8,
}

impl DataType {
    /// Maps a TIFF field type code, `None` for codes this reader cannot size
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            field_types::BYTE | field_types::ASCII | field_types::UNDEFINED => Some(DataType::UByte),
            field_types::SBYTE => Some(DataType::Byte),
            field_types::SHORT => Some(DataType::UShort),
            field_types::SSHORT => Some(DataType::Short),
            field_types::LONG => Some(DataType::UInt),
            field_types::SLONG => Some(DataType::Int),
            field_types::LONG8 => Some(DataType::ULong),
            field_types::SLONG8 => Some(DataType::Long),
            field_types::FLOAT => Some(DataType::Float),
            field_types::DOUBLE => Some(DataType::Double),
            field_types::IFD => Some(DataType::Ifd),
            field_types::IFD8 => Some(DataType::Ifd8),
            _ => None,
        }
    }

    /// Canonical TIFF field type code
    pub fn code(&self) -> u16 {
        match self {
            DataType::UByte => field_types::BYTE,
            DataType::Byte => field_types::SBYTE,
            DataType::UShort => field_types::SHORT,
            DataType::Short => field_types::SSHORT,
            DataType::UInt => field_types::LONG,
            DataType::Int => field_types::SLONG,
            DataType::ULong => field_types::LONG8,
            DataType::Long => field_types::SLONG8,
            DataType::Float => field_types::FLOAT,
            DataType::Double => field_types::DOUBLE,
            DataType::Ifd => field_types::IFD,
            DataType::Ifd8 => field_types::IFD8,
        }
    }

    /// Size in bytes of a single value
    pub fn size(&self) -> usize {
        match self {
            DataType::Byte | DataType::UByte => 1,
            DataType::Short | DataType::UShort => 2,
            DataType::Int | DataType::UInt | DataType::Float | DataType::Ifd => 4,
            DataType::Long | DataType::ULong | DataType::Double | DataType::Ifd8 => 8,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, DataType::Float | DataType::Double)
    }

    /// Decodes one integer value from the start of `bytes`
    ///
    /// Signed values are sign-extended before the cast. Floating point types
    /// return `None`.
    pub fn decode_integer(&self, bytes: &[u8], order: ByteOrder) -> Option<u64> {
        let value = match self {
            DataType::UByte => bytes[0] as u64,
            DataType::Byte => bytes[0] as i8 as i64 as u64,
            DataType::UShort => order.read_u16(bytes) as u64,
            DataType::Short => order.read_i16(bytes) as i64 as u64,
            DataType::UInt | DataType::Ifd => order.read_u32(bytes) as u64,
            DataType::Int => order.read_i32(bytes) as i64 as u64,
            DataType::ULong | DataType::Ifd8 => order.read_u64(bytes),
            DataType::Long => order.read_i64(bytes) as u64,
            DataType::Float | DataType::Double => return None,
        };
        Some(value)
    }
}

/// Primitive type of the pixel samples, chosen from bit depth and sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleKind {
    /// Selects the sample kind for a bit depth and `SampleFormat` tag value
    pub fn from_format(bits_per_sample: u32, format: u64) -> TiffResult<Self> {
        let kind = match (format, bits_per_sample) {
            (sample_format::UNSIGNED, 8) => SampleKind::U8,
            (sample_format::UNSIGNED, 16) => SampleKind::U16,
            (sample_format::UNSIGNED, 32) => SampleKind::U32,
            (sample_format::SIGNED, 8) => SampleKind::I8,
            (sample_format::SIGNED, 16) => SampleKind::I16,
            (sample_format::SIGNED, 32) => SampleKind::I32,
            (sample_format::IEEEFP, 32) => SampleKind::F32,
            (sample_format::IEEEFP, 64) => SampleKind::F64,
            (sample_format::UNSIGNED, bits)
            | (sample_format::SIGNED, bits)
            | (sample_format::IEEEFP, bits) => {
                return Err(TiffError::UnsupportedValue { field: "bitsPerSample", value: bits as u64 })
            }
            (other, _) => return Err(TiffError::UnsupportedValue { field: "sampleFormat", value: other }),
        };
        Ok(kind)
    }

    /// Size of one sample in bytes
    pub fn size(&self) -> usize {
        match self {
            SampleKind::U8 | SampleKind::I8 => 1,
            SampleKind::U16 | SampleKind::I16 => 2,
            SampleKind::U32 | SampleKind::I32 | SampleKind::F32 => 4,
            SampleKind::F64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleKind::U8 => "u8",
            SampleKind::I8 => "i8",
            SampleKind::U16 => "u16",
            SampleKind::I16 => "i16",
            SampleKind::U32 => "u32",
            SampleKind::I32 => "i32",
            SampleKind::F32 => "f32",
            SampleKind::F64 => "f64",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
