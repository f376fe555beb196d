//! Tests for the TIFF types module

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::field_types;
use crate::tiff::errors::TiffError;
use crate::tiff::types::{DataType, FileFormat, SampleKind};

#[test]
fn test_format_sizes() {
    let classic = FileFormat::new(false, ByteOrder::LittleEndian);
    assert_eq!((classic.count_size(), classic.entry_size(), classic.word_size()), (2, 12, 4));

    let big = FileFormat::new(true, ByteOrder::BigEndian);
    assert_eq!((big.count_size(), big.entry_size(), big.word_size()), (8, 20, 8));
    assert_eq!(big.to_string(), "BigTIFF, Big Endian (MM)");
}

#[test]
fn test_data_type_codes() {
    assert_eq!(DataType::from_code(field_types::SHORT), Some(DataType::UShort));
    assert_eq!(DataType::from_code(field_types::ASCII), Some(DataType::UByte));
    assert_eq!(DataType::from_code(field_types::RATIONAL), None);
    assert_eq!(DataType::from_code(field_types::LONG8).map(|t| t.size()), Some(8));
    assert_eq!(DataType::Ifd.code(), field_types::IFD);
}

#[test]
fn test_signed_values_sign_extend() {
    let value = DataType::Short.decode_integer(&[0xFF, 0xFE], ByteOrder::BigEndian).unwrap();
    assert_eq!(value as i64, -2);
    assert_eq!(DataType::Double.decode_integer(&[0; 8], ByteOrder::LittleEndian), None);
}

#[test]
fn test_sample_kind_selection() {
    assert_eq!(SampleKind::from_format(8, 1).unwrap(), SampleKind::U8);
    assert_eq!(SampleKind::from_format(16, 2).unwrap(), SampleKind::I16);
    assert_eq!(SampleKind::from_format(64, 3).unwrap(), SampleKind::F64);
    assert!(matches!(
        SampleKind::from_format(12, 1),
        Err(TiffError::UnsupportedValue { field: "bitsPerSample", value: 12 })
    ));
    assert!(matches!(
        SampleKind::from_format(16, 3),
        Err(TiffError::UnsupportedValue { field: "bitsPerSample", value: 16 })
    ));
    assert!(matches!(
        SampleKind::from_format(8, 4),
        Err(TiffError::UnsupportedValue { field: "sampleFormat", value: 4 })
    ));
}
