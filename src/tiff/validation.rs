//! TIFF validation utilities
//!
//! Checks applied while a header or directory is decoded. Each failure names
//! the offending field so callers can tell what the reader refused.

use log::error;

use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};

/// Validates the two extra BigTIFF header words
///
/// After the version number (43) come the offset size, which must be 8, and a
/// reserved word, which must be 0.
pub fn validate_bigtiff_header(offset_size: u16, reserved: u16) -> TiffResult<()> {
    if offset_size != header::BIGTIFF_OFFSET_SIZE || reserved != 0 {
        error!("Invalid BigTIFF header: offset_size={}, reserved={}", offset_size, reserved);
        return Err(TiffError::InvalidBigTiffHeader { offset_size, reserved });
    }

    Ok(())
}

/// Checks a validation tag against the single value this reader supports
pub fn validate_supported(field: &'static str, value: u64, supported: u64) -> TiffResult<()> {
    if value != supported {
        return Err(TiffError::UnsupportedValue { field, value });
    }

    Ok(())
}

/// Narrows a dimension to u32, rejecting zero and overflow
pub fn positive_u32(field: &'static str, value: u64) -> TiffResult<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(TiffError::FormatError(format!("Invalid {}: {}", field, value))),
    }
}

/// Validates a bits-per-sample array: one entry per sample, all equal
pub fn uniform_bits_per_sample(bits: &[u64], samples_per_pixel: u32) -> TiffResult<Vec<u32>> {
    if bits.len() != samples_per_pixel as usize {
        return Err(TiffError::FormatError(format!(
            "bitsPerSample has {} entries for {} samples per pixel",
            bits.len(),
            samples_per_pixel
        )));
    }

    let first = uniform_value("bitsPerSample", bits)?;
    let first = u32::try_from(first)
        .map_err(|_| TiffError::UnsupportedValue { field: "bitsPerSample", value: first })?;

    Ok(vec![first; bits.len()])
}

/// Returns the common value of an array whose entries must all be equal
pub fn uniform_value(field: &'static str, values: &[u64]) -> TiffResult<u64> {
    let first = *values
        .first()
        .ok_or_else(|| TiffError::FormatError(format!("{} is empty", field)))?;

    if let Some(other) = values.iter().find(|&&v| v != first) {
        return Err(TiffError::FormatError(format!(
            "Inconsistent {} across bands: {} and {}",
            field, first, other
        )));
    }

    Ok(first)
}

/// Checks that the offsets array has one entry per tile of the grid
pub fn validate_tile_count(
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    actual: usize,
) -> TiffResult<()> {
    let expected = (width as usize)
        .div_ceil(tile_width as usize)
        .checked_mul((height as usize).div_ceil(tile_height as usize))
        .ok_or_else(|| TiffError::FormatError("Tile count overflows".to_string()))?;

    if expected != actual {
        return Err(TiffError::FormatError(format!(
            "Image of {}x{} with {}x{} tiles needs {} tile offsets, found {}",
            width, height, tile_width, tile_height, expected, actual
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bigtiff_header_words() {
        assert!(validate_bigtiff_header(8, 0).is_ok());
        assert!(matches!(validate_bigtiff_header(4, 0), Err(TiffError::InvalidBigTiffHeader { .. })));
        assert!(matches!(validate_bigtiff_header(8, 1), Err(TiffError::InvalidBigTiffHeader { .. })));
    }

    #[test]
    fn test_uniform_bits() {
        assert_eq!(uniform_bits_per_sample(&[16, 16, 16], 3).unwrap(), vec![16, 16, 16]);
        assert!(uniform_bits_per_sample(&[8, 8], 3).is_err());
        assert!(uniform_bits_per_sample(&[8, 16, 8], 3).is_err());
    }

    #[test]
    fn test_tile_count() {
        assert!(validate_tile_count(8922, 5907, 256, 256, 840).is_ok());
        assert!(validate_tile_count(8922, 5907, 256, 256, 839).is_err());
    }

    #[test]
    fn test_positive_u32() {
        assert_eq!(positive_u32("width", 12).unwrap(), 12);
        assert!(positive_u32("width", 0).is_err());
        assert!(positive_u32("width", u64::MAX).is_err());
    }
}
