//! Deferred loading of out-of-line array values
//!
//! Array entries too long for the inline value slot only carry a file offset.
//! They are collected while a directory is scanned and loaded afterwards in
//! ascending offset order, so the channel is read front to back.

use log::{debug, trace};

use crate::io::cursor::ByteCursor;
use crate::io::seekable::SeekableReader;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::types::DataType;

/// Descriptor field an array value is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayTarget {
    BitsPerSample,
    SampleFormat,
    TileOffsets,
    StripOffsets,
}

impl ArrayTarget {
    /// Field name used in error messages
    pub fn field_name(&self) -> &'static str {
        match self {
            ArrayTarget::BitsPerSample => "bitsPerSample",
            ArrayTarget::SampleFormat => "sampleFormat",
            ArrayTarget::TileOffsets => "tileOffsets",
            ArrayTarget::StripOffsets => "stripOffsets",
        }
    }
}

/// An array whose values live elsewhere in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredArray {
    /// Field the values belong to
    pub target: ArrayTarget,
    /// File offset of the first value
    pub offset: u64,
    /// Element type
    pub data_type: DataType,
    /// Number of elements
    pub length: usize,
}

/// Loads every deferred array, in ascending file offset order
///
/// Returns the values paired with their target, in the order they were read.
pub fn resolve_arrays<R: SeekableReader>(
    cursor: &mut ByteCursor<R>,
    mut arrays: Vec<DeferredArray>,
) -> TiffResult<Vec<(ArrayTarget, Vec<u64>)>> {
    arrays.sort_by_key(|array| array.offset);

    let mut resolved = Vec::with_capacity(arrays.len());
    for array in arrays {
        debug!(
            "Loading {} ({} x {:?}) at offset {}",
            array.target.field_name(),
            array.length,
            array.data_type,
            array.offset
        );
        let values = read_array(cursor, &array)?;
        resolved.push((array.target, values));
    }

    Ok(resolved)
}

/// Streams one array through the cursor, refilling as needed
fn read_array<R: SeekableReader>(cursor: &mut ByteCursor<R>, array: &DeferredArray) -> TiffResult<Vec<u64>> {
    let field = array.target.field_name();
    if array.data_type.is_floating_point() {
        return Err(TiffError::UnsupportedDataType { field, data_type: array.data_type.code() });
    }

    let size = array.data_type.size();
    let total_bytes = array
        .length
        .checked_mul(size)
        .ok_or_else(|| TiffError::FormatError(format!("{} array length {} overflows", field, array.length)))?;

    let order = cursor.byte_order();
    let mut values = Vec::with_capacity(array.length.min(1 << 20));
    let mut position = array.offset;
    let mut remaining = array.length;

    while remaining > 0 {
        cursor.ensure(position, size, remaining * size)?;
        let batch = (cursor.available() / size).min(remaining);
        let bytes = cursor.read_bytes(batch * size)?;

        for chunk in bytes.chunks_exact(size) {
            let value = array
                .data_type
                .decode_integer(chunk, order)
                .ok_or(TiffError::UnsupportedDataType { field, data_type: array.data_type.code() })?;
            values.push(value);
        }

        trace!("Read {} values of {} at offset {}", batch, field, position);
        position += (batch * size) as u64;
        remaining -= batch;
    }

    debug_assert_eq!(values.len() * size, total_bytes);
    Ok(values)
}
