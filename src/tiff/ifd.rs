//! Image File Directory (IFD) entries and tag recognition
//!
//! A directory is a count followed by fixed-size entries. Each entry is
//! decoded into a [`RecognizedTag`] and folded into a
//! [`DescriptorBuilder`]. Scanning touches only the bytes it is given; arrays
//! stored elsewhere in the file come back as [`DeferredArray`]s to be loaded
//! later.

use log::{trace, warn};

use crate::tiff::constants::tags;
use crate::tiff::deferred::{ArrayTarget, DeferredArray};
use crate::tiff::descriptor::DescriptorBuilder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::types::{DataType, FileFormat};

/// One raw entry of an Image File Directory
///
/// The value slot holds the values themselves when they fit, otherwise the
/// file offset where they are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type code
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Raw value slot, only the first `word_size` bytes are meaningful
    slot: [u8; 8],
}

/// Value of an array-valued tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayValue {
    /// Values decoded from the inline slot
    Inline(Vec<u64>),
    /// Values still on disk
    Deferred(DeferredArray),
}

/// A directory entry classified by tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizedTag {
    Width(u64),
    Height(u64),
    BitsPerSample(ArrayValue),
    Compression(u64),
    PhotometricInterpretation(u64),
    StripOffsets(ArrayValue),
    SamplesPerPixel(u64),
    RowsPerStrip(u64),
    PlanarConfiguration(u64),
    TileWidth(u64),
    TileHeight(u64),
    TileOffsets(ArrayValue),
    SampleFormat(ArrayValue),
    Unrecognized(u16),
}

impl DirectoryEntry {
    /// Decodes an entry from its on-disk bytes
    ///
    /// `bytes` must hold at least `format.entry_size()` bytes.
    pub fn parse(bytes: &[u8], format: &FileFormat) -> Self {
        let order = format.byte_order;
        let word = format.word_size();

        let tag = order.read_u16(&bytes[0..2]);
        let field_type = order.read_u16(&bytes[2..4]);
        let count = order.read_word(&bytes[4..4 + word], format.big_tiff);

        let mut slot = [0u8; 8];
        slot[..word].copy_from_slice(&bytes[4 + word..4 + 2 * word]);

        DirectoryEntry { tag, field_type, count, slot }
    }

    /// Data type of the values, `None` if the code is not supported
    pub fn data_type(&self) -> Option<DataType> {
        DataType::from_code(self.field_type)
    }

    /// Whether all values fit in the inline slot
    pub fn is_value_inline(&self, format: &FileFormat) -> bool {
        match self.data_type() {
            Some(data_type) => (data_type.size() as u64)
                .checked_mul(self.count)
                .map_or(false, |total| total <= format.word_size() as u64),
            None => false,
        }
    }

    /// Interprets the slot as a file offset
    pub fn value_offset(&self, format: &FileFormat) -> u64 {
        format.byte_order.read_word(&self.slot, format.big_tiff)
    }

    fn integer_type(&self, field: &'static str) -> TiffResult<DataType> {
        match self.data_type() {
            Some(data_type) if !data_type.is_floating_point() => Ok(data_type),
            _ => Err(TiffError::UnsupportedDataType { field, data_type: self.field_type }),
        }
    }

    /// Decodes the first value of a scalar-valued entry
    pub fn scalar(&self, field: &'static str, format: &FileFormat) -> TiffResult<u64> {
        let data_type = self.integer_type(field)?;
        if self.count == 0 {
            return Err(TiffError::FormatError(format!("{} has no value", field)));
        }
        if data_type.size() > format.word_size() {
            return Err(TiffError::UnsupportedDataType { field, data_type: self.field_type });
        }
        data_type
            .decode_integer(&self.slot, format.byte_order)
            .ok_or(TiffError::UnsupportedDataType { field, data_type: self.field_type })
    }

    /// Decodes an array-valued entry, deferring it when stored out of line
    pub fn array(&self, target: ArrayTarget, format: &FileFormat) -> TiffResult<ArrayValue> {
        let field = target.field_name();
        let data_type = self.integer_type(field)?;
        let length = usize::try_from(self.count)
            .map_err(|_| TiffError::FormatError(format!("{} count {} is too large", field, self.count)))?;

        if self.is_value_inline(format) {
            let size = data_type.size();
            let values = self.slot[..length * size]
                .chunks_exact(size)
                .filter_map(|chunk| data_type.decode_integer(chunk, format.byte_order))
                .collect();
            Ok(ArrayValue::Inline(values))
        } else {
            Ok(ArrayValue::Deferred(DeferredArray {
                target,
                offset: self.value_offset(format),
                data_type,
                length,
            }))
        }
    }
}

impl RecognizedTag {
    /// Classifies an entry by tag and decodes its value
    pub fn from_entry(entry: &DirectoryEntry, format: &FileFormat) -> TiffResult<Self> {
        let tag = match entry.tag {
            tags::IMAGE_WIDTH => RecognizedTag::Width(entry.scalar("width", format)?),
            tags::IMAGE_LENGTH => RecognizedTag::Height(entry.scalar("height", format)?),
            tags::BITS_PER_SAMPLE => RecognizedTag::BitsPerSample(entry.array(ArrayTarget::BitsPerSample, format)?),
            tags::COMPRESSION => RecognizedTag::Compression(entry.scalar("compression", format)?),
            tags::PHOTOMETRIC_INTERPRETATION => {
                RecognizedTag::PhotometricInterpretation(entry.scalar("photometricInterpretation", format)?)
            }
            tags::STRIP_OFFSETS => RecognizedTag::StripOffsets(entry.array(ArrayTarget::StripOffsets, format)?),
            tags::SAMPLES_PER_PIXEL => RecognizedTag::SamplesPerPixel(entry.scalar("samplesPerPixel", format)?),
            tags::ROWS_PER_STRIP => RecognizedTag::RowsPerStrip(entry.scalar("rowsPerStrip", format)?),
            tags::PLANAR_CONFIGURATION => {
                RecognizedTag::PlanarConfiguration(entry.scalar("planarConfiguration", format)?)
            }
            tags::TILE_WIDTH => RecognizedTag::TileWidth(entry.scalar("tileWidth", format)?),
            tags::TILE_LENGTH => RecognizedTag::TileHeight(entry.scalar("tileHeight", format)?),
            tags::TILE_OFFSETS => RecognizedTag::TileOffsets(entry.array(ArrayTarget::TileOffsets, format)?),
            tags::SAMPLE_FORMAT => RecognizedTag::SampleFormat(entry.array(ArrayTarget::SampleFormat, format)?),
            other => {
                if entry.data_type().is_none() {
                    warn!("Ignoring tag {} with unknown data type {}", other, entry.field_type);
                }
                RecognizedTag::Unrecognized(other)
            }
        };
        Ok(tag)
    }
}

/// Scans the entries of one directory without performing any I/O
///
/// `entries` holds the raw entry bytes, excluding the leading count and the
/// trailing next-directory pointer. Validation tags are checked as they are
/// met; arrays stored out of line are returned for later resolution.
pub fn scan_directory(entries: &[u8], format: &FileFormat) -> TiffResult<(DescriptorBuilder, Vec<DeferredArray>)> {
    let mut builder = DescriptorBuilder::default();
    let mut deferred = Vec::new();

    for chunk in entries.chunks_exact(format.entry_size()) {
        let entry = DirectoryEntry::parse(chunk, format);
        trace!(
            "Entry: tag={:#06x}, type={}, count={}, inline={}",
            entry.tag,
            entry.field_type,
            entry.count,
            entry.is_value_inline(format)
        );

        let tag = RecognizedTag::from_entry(&entry, format)?;
        builder.apply(tag, &mut deferred)?;
    }

    Ok((builder, deferred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::byte_order::ByteOrder;

    fn classic_le() -> FileFormat {
        FileFormat::new(false, ByteOrder::LittleEndian)
    }

    fn entry_bytes(tag: u16, field_type: u16, count: u32, value: [u8; 4]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&tag.to_le_bytes());
        bytes.extend_from_slice(&field_type.to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&value);
        bytes
    }

    #[test]
    fn test_short_scalar_is_left_justified() {
        let format = FileFormat::new(false, ByteOrder::BigEndian);
        let bytes = [0x01, 0x00, 0x00, 0x03, 0, 0, 0, 1, 0x01, 0x2C, 0xFF, 0xFF];
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert_eq!(entry.tag, tags::IMAGE_WIDTH);
        assert_eq!(entry.scalar("width", &format).unwrap(), 300);
    }

    #[test]
    fn test_inline_array() {
        let format = classic_le();
        let bytes = entry_bytes(tags::BITS_PER_SAMPLE, 3, 2, [8, 0, 8, 0]);
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert_eq!(
            entry.array(ArrayTarget::BitsPerSample, &format).unwrap(),
            ArrayValue::Inline(vec![8, 8])
        );
    }

    #[test]
    fn test_out_of_line_array_is_deferred() {
        let format = classic_le();
        let bytes = entry_bytes(tags::TILE_OFFSETS, 4, 4, 200u32.to_le_bytes());
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert_eq!(
            entry.array(ArrayTarget::TileOffsets, &format).unwrap(),
            ArrayValue::Deferred(DeferredArray {
                target: ArrayTarget::TileOffsets,
                offset: 200,
                data_type: DataType::UInt,
                length: 4,
            })
        );
    }

    #[test]
    fn test_bigtiff_inline_slot_holds_two_longs() {
        let format = FileFormat::new(true, ByteOrder::LittleEndian);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&tags::TILE_OFFSETS.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&32u32.to_le_bytes());
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert!(entry.is_value_inline(&format));
        assert_eq!(
            RecognizedTag::from_entry(&entry, &format).unwrap(),
            RecognizedTag::TileOffsets(ArrayValue::Inline(vec![16, 32]))
        );
    }

    #[test]
    fn test_floating_point_array_rejected() {
        let format = classic_le();
        let bytes = entry_bytes(tags::TILE_OFFSETS, 11, 1, [0, 0, 0, 0]);
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert!(matches!(
            RecognizedTag::from_entry(&entry, &format),
            Err(TiffError::UnsupportedDataType { field: "tileOffsets", data_type: 11 })
        ));
    }

    #[test]
    fn test_unknown_tag_is_unrecognized() {
        let format = classic_le();
        let bytes = entry_bytes(0x0131, 2, 10, [0, 1, 0, 0]);
        let entry = DirectoryEntry::parse(&bytes, &format);
        assert_eq!(RecognizedTag::from_entry(&entry, &format).unwrap(), RecognizedTag::Unrecognized(0x0131));
    }

    #[test]
    fn test_scan_rejects_compression() {
        let format = classic_le();
        let mut entries = entry_bytes(tags::IMAGE_WIDTH, 3, 1, [4, 0, 0, 0]);
        entries.extend(entry_bytes(tags::COMPRESSION, 3, 1, [5, 0, 0, 0]));
        match scan_directory(&entries, &format) {
            Err(err) => assert_eq!(err.field(), Some("compression")),
            Ok(_) => panic!("compressed directory accepted"),
        }
    }
}
