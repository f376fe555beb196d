//! TIFF header decoding
//!
//! Reads the byte order marker, the version word and, for BigTIFF, the two
//! extra header words, then returns the offset of the first directory.

use log::debug;

use crate::io::byte_order::ByteOrder;
use crate::io::cursor::ByteCursor;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::header;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::types::FileFormat;
use crate::tiff::validation;

/// Parses the header at the start of the channel
///
/// On success the cursor's byte order is set and the format variant and first
/// directory offset are returned.
pub fn read_header<R: SeekableReader>(cursor: &mut ByteCursor<R>) -> TiffResult<(FileFormat, u64)> {
    // A classic header is only 8 bytes long
    cursor.ensure(0, 8, header::HEADER_WINDOW)?;

    let marker = cursor.read_bytes(2)?;
    let byte_order = ByteOrder::detect([marker[0], marker[1]])?;
    debug!("Detected byte order: {}", byte_order.name());
    cursor.set_byte_order(byte_order);

    let version = cursor.read_u16()?;
    debug!("TIFF version: {}", version);

    let format = match version {
        header::TIFF_VERSION => {
            debug!("Detected standard TIFF format");
            FileFormat::new(false, byte_order)
        }
        header::BIG_TIFF_VERSION => {
            debug!("Detected BigTIFF format");
            cursor.ensure(4, 12, 12)?;
            let offset_size = cursor.read_u16()?;
            let reserved = cursor.read_u16()?;
            validation::validate_bigtiff_header(offset_size, reserved)?;
            FileFormat::new(true, byte_order)
        }
        _ => return Err(TiffError::UnsupportedVersion(version)),
    };

    let first_ifd_offset = cursor.read_word(format.big_tiff)?;
    debug!("First IFD offset: {}", first_ifd_offset);

    Ok((format, first_ifd_offset))
}
