//! Streaming tile samples into a destination raster
//!
//! Each tile is read through the shared [`ByteCursor`] row by row. The sample
//! type and byte order are resolved once per tile, selecting a monomorphized
//! row copy; the inner loop only slices and decodes.

use byteorder::{BigEndian, LittleEndian};
use log::{debug, trace};

use crate::extractor::listener::{ReadListener, ReadStatus};
use crate::extractor::raster::{Raster, RasterData};
use crate::extractor::tile_locator::Tile;
use crate::io::byte_order::ByteOrder;
use crate::io::cursor::ByteCursor;
use crate::io::seekable::SeekableReader;
use crate::tiff::descriptor::ImageDescriptor;
use crate::tiff::errors::{TiffError, TiffResult};

/// A primitive sample decodable from raw file bytes
pub trait Sample: Copy {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Decodes one sample from the first `SIZE` bytes of `bytes`
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self;
}

impl Sample for u8 {
    const SIZE: usize = 1;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Sample for i8 {
    const SIZE: usize = 1;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }
}

impl Sample for u16 {
    const SIZE: usize = 2;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_u16(bytes)
    }
}

impl Sample for i16 {
    const SIZE: usize = 2;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_i16(bytes)
    }
}

impl Sample for u32 {
    const SIZE: usize = 4;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_u32(bytes)
    }
}

impl Sample for i32 {
    const SIZE: usize = 4;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_i32(bytes)
    }
}

impl Sample for f32 {
    const SIZE: usize = 4;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_f32(bytes)
    }
}

impl Sample for f64 {
    const SIZE: usize = 8;
    fn decode<B: byteorder::ByteOrder>(bytes: &[u8]) -> Self {
        B::read_f64(bytes)
    }
}

/// Geometry shared by every tile of one read
#[derive(Debug, Clone, Copy)]
struct CopyLayout {
    bands: usize,
    /// Bytes per source pixel
    pixel_stride: usize,
    /// Bytes per source tile row
    row_stride: usize,
    x_subsampling: usize,
    y_subsampling: usize,
    /// Destination raster width in pixels
    dest_width: usize,
}

/// Copies every tile into `raster`, in the order given
///
/// `tiles` must come from the tile locator for the same descriptor and
/// subsampling, and `raster` must have the descriptor's sample kind and band
/// count. Returns [`ReadStatus::Aborted`] as soon as the listener asks to stop.
pub fn copy_tiles<R: SeekableReader, L: ReadListener + ?Sized>(
    cursor: &mut ByteCursor<R>,
    descriptor: &ImageDescriptor,
    tiles: &[Tile],
    x_subsampling: u32,
    y_subsampling: u32,
    raster: &mut Raster,
    listener: &mut L,
) -> TiffResult<ReadStatus> {
    if raster.sample_kind() != descriptor.sample_kind || raster.bands != descriptor.samples_per_pixel {
        return Err(TiffError::UnsupportedOperation(format!(
            "Destination holds {} bands of {}, image has {} bands of {}",
            raster.bands,
            raster.sample_kind(),
            descriptor.samples_per_pixel,
            descriptor.sample_kind
        )));
    }

    let layout = CopyLayout {
        bands: descriptor.samples_per_pixel as usize,
        pixel_stride: descriptor.pixel_stride(),
        row_stride: descriptor.tile_row_stride(),
        x_subsampling: x_subsampling as usize,
        y_subsampling: y_subsampling as usize,
        dest_width: raster.width as usize,
    };
    let order = cursor.byte_order();

    debug!("Copying {} tiles of {} ({} byte pixels)", tiles.len(), descriptor.sample_kind, layout.pixel_stride);

    for (done, tile) in tiles.iter().enumerate() {
        let status = match &mut raster.data {
            RasterData::U8(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::I8(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::U16(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::I16(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::U32(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::I32(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::F32(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
            RasterData::F64(data) => copy_tile(cursor, tile, &layout, order, data, listener)?,
        };

        if status == ReadStatus::Aborted {
            debug!("Read aborted after {} of {} tiles", done, tiles.len());
            listener.read_aborted();
            return Ok(ReadStatus::Aborted);
        }

        listener.progress(100.0 * (done + 1) as f32 / tiles.len() as f32);
    }

    Ok(ReadStatus::Complete)
}

fn copy_tile<T: Sample, R: SeekableReader, L: ReadListener + ?Sized>(
    cursor: &mut ByteCursor<R>,
    tile: &Tile,
    layout: &CopyLayout,
    order: ByteOrder,
    data: &mut [T],
    listener: &mut L,
) -> TiffResult<ReadStatus> {
    match order {
        ByteOrder::LittleEndian => copy_tile_rows::<T, LittleEndian, R, L>(cursor, tile, layout, data, listener),
        ByteOrder::BigEndian => copy_tile_rows::<T, BigEndian, R, L>(cursor, tile, layout, data, listener),
    }
}

fn copy_tile_rows<T: Sample, B: byteorder::ByteOrder, R: SeekableReader, L: ReadListener + ?Sized>(
    cursor: &mut ByteCursor<R>,
    tile: &Tile,
    layout: &CopyLayout,
    data: &mut [T],
    listener: &mut L,
) -> TiffResult<ReadStatus> {
    let width = tile.dest.width as usize;
    let height = tile.dest.height as usize;
    let column_step = layout.x_subsampling * layout.pixel_stride;
    let row_step = layout.y_subsampling * layout.row_stride;

    // Bytes from the first to the last sampled pixel of one output row
    let row_span = (width - 1) * column_step + layout.pixel_stride;
    let tile_span = (height - 1) * row_step + row_span;

    // Contiguous rows with no gaps can be fetched in a single request
    let whole_tile = layout.x_subsampling == 1 && layout.y_subsampling == 1 && row_span == layout.row_stride;
    let whole_tile = whole_tile && tile_span <= cursor.capacity();
    if whole_tile {
        cursor.ensure(tile.file_position, tile_span, tile_span)?;
    }

    trace!(
        "Tile at {}: {}x{} pixels to {:?}, {} bytes{}",
        tile.file_position,
        width,
        height,
        tile.dest,
        tile_span,
        if whole_tile { " in one pass" } else { "" }
    );

    let row_samples = width * layout.bands;
    for row in 0..height {
        if listener.abort_requested() {
            return Ok(ReadStatus::Aborted);
        }

        let source_offset = row * row_step;
        let bytes = if whole_tile {
            &cursor.peek()[source_offset..source_offset + row_span]
        } else {
            let position = tile.file_position + source_offset as u64;
            cursor.ensure(position, row_span, tile_span - source_offset)?;
            &cursor.peek()[..row_span]
        };

        let dest_start = ((tile.dest.y as usize + row) * layout.dest_width + tile.dest.x as usize) * layout.bands;
        copy_row::<T, B>(bytes, &mut data[dest_start..dest_start + row_samples], layout.bands, column_step);
    }

    Ok(ReadStatus::Complete)
}

/// Decodes `dest.len() / bands` pixels, taking one every `column_step` bytes
fn copy_row<T: Sample, B: byteorder::ByteOrder>(source: &[u8], dest: &mut [T], bands: usize, column_step: usize) {
    for (i, pixel) in dest.chunks_exact_mut(bands).enumerate() {
        let base = i * column_step;
        for (band, sample) in pixel.iter_mut().enumerate() {
            let at = base + band * T::SIZE;
            *sample = T::decode::<B>(&source[at..at + T::SIZE]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::listener::NoopListener;
    use crate::extractor::region::Region;
    use crate::extractor::tile_locator::locate;
    use crate::tiff::types::SampleKind;
    use std::io::Cursor;

    /// 4x4 single band, 2x2 tiles stored back to back from offset 0
    fn four_tiles() -> (ImageDescriptor, Vec<u8>) {
        let descriptor = ImageDescriptor {
            width: 4,
            height: 4,
            tile_width: 2,
            tile_height: 2,
            samples_per_pixel: 1,
            bits_per_sample: vec![8],
            sample_kind: SampleKind::U8,
            tile_offsets: vec![0, 4, 8, 12],
            tiled: true,
        };
        // Tile t, position p holds 10 * (t + 1) + p
        let bytes = (0..4u8).flat_map(|t| (0..4u8).map(move |p| 10 * (t + 1) + p)).collect();
        (descriptor, bytes)
    }

    fn read(descriptor: &ImageDescriptor, bytes: Vec<u8>, region: Region, sx: u32, sy: u32, capacity: usize) -> Raster {
        let mut cursor = ByteCursor::new(Cursor::new(bytes), capacity);
        let tiles = locate(descriptor, &region, sx, sy).unwrap();
        let mut raster = Raster::allocate(region.width.div_ceil(sx), region.height.div_ceil(sy), descriptor.sample_kind, 1);
        let status = copy_tiles(&mut cursor, descriptor, &tiles, sx, sy, &mut raster, &mut NoopListener).unwrap();
        assert_eq!(status, ReadStatus::Complete);
        raster
    }

    #[test]
    fn test_full_resolution() {
        let (descriptor, bytes) = four_tiles();
        let raster = read(&descriptor, bytes, Region::full(4, 4), 1, 1, 64);
        assert_eq!(
            raster.data,
            RasterData::U8(vec![10, 11, 20, 21, 12, 13, 22, 23, 30, 31, 40, 41, 32, 33, 42, 43])
        );
    }

    #[test]
    fn test_partial_region_matches_full_read() {
        let (descriptor, bytes) = four_tiles();
        let full = read(&descriptor, bytes.clone(), Region::full(4, 4), 1, 1, 64);
        let part = read(&descriptor, bytes, Region::new(1, 1, 3, 2), 1, 1, 16);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(part.sample_f64(x, y, 0), full.sample_f64(x + 1, y + 1, 0));
            }
        }
    }

    #[test]
    fn test_subsample_takes_tile_corners() {
        let (descriptor, bytes) = four_tiles();
        let raster = read(&descriptor, bytes, Region::full(4, 4), 2, 2, 64);
        assert_eq!(raster.data, RasterData::U8(vec![10, 20, 30, 40]));
    }

    #[test]
    fn test_big_endian_u16_with_bands() {
        let descriptor = ImageDescriptor {
            width: 2,
            height: 1,
            tile_width: 2,
            tile_height: 1,
            samples_per_pixel: 2,
            bits_per_sample: vec![16, 16],
            sample_kind: SampleKind::U16,
            tile_offsets: vec![2],
            tiled: true,
        };
        let bytes = vec![0xFF, 0xFF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF, 0x08];
        let mut cursor = ByteCursor::new(Cursor::new(bytes), 16);
        cursor.set_byte_order(ByteOrder::BigEndian);
        let tiles = locate(&descriptor, &Region::full(2, 1), 1, 1).unwrap();
        let mut raster = Raster::allocate(2, 1, SampleKind::U16, 2);
        copy_tiles(&mut cursor, &descriptor, &tiles, 1, 1, &mut raster, &mut NoopListener).unwrap();
        assert_eq!(raster.data, RasterData::U16(vec![0x0102, 0x0304, 0x0506, 0xFF08]));
    }

    #[test]
    fn test_signed_and_float_decoding() {
        assert_eq!(<i16 as Sample>::decode::<LittleEndian>(&[0xFE, 0xFF]), -2);
        assert_eq!(<i8 as Sample>::decode::<BigEndian>(&[0x80]), -128);
        assert_eq!(<f32 as Sample>::decode::<BigEndian>(&1.5f32.to_be_bytes()), 1.5);
        assert_eq!(<f64 as Sample>::decode::<LittleEndian>(&(-0.25f64).to_le_bytes()), -0.25);
    }

    struct AbortAfter {
        polls: std::cell::Cell<usize>,
        limit: usize,
        aborted: bool,
    }

    impl ReadListener for AbortAfter {
        fn abort_requested(&self) -> bool {
            let polls = self.polls.get() + 1;
            self.polls.set(polls);
            polls > self.limit
        }

        fn read_aborted(&mut self) {
            self.aborted = true;
        }
    }

    #[test]
    fn test_abort_leaves_partial_raster() {
        let (descriptor, bytes) = four_tiles();
        let mut cursor = ByteCursor::new(Cursor::new(bytes), 64);
        let tiles = locate(&descriptor, &Region::full(4, 4), 1, 1).unwrap();
        let mut raster = Raster::allocate(4, 4, SampleKind::U8, 1);
        let mut listener = AbortAfter { polls: std::cell::Cell::new(0), limit: 3, aborted: false };

        let status = copy_tiles(&mut cursor, &descriptor, &tiles, 1, 1, &mut raster, &mut listener).unwrap();

        assert_eq!(status, ReadStatus::Aborted);
        assert!(listener.aborted);
        // First tile and the first row of the second
        assert_eq!(raster.data, RasterData::U8(vec![10, 11, 20, 21, 12, 13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]));
    }

    #[test]
    fn test_mismatched_destination_rejected() {
        let (descriptor, bytes) = four_tiles();
        let mut cursor = ByteCursor::new(Cursor::new(bytes), 64);
        let tiles = locate(&descriptor, &Region::full(4, 4), 1, 1).unwrap();
        let mut raster = Raster::allocate(4, 4, SampleKind::U16, 1);
        assert!(matches!(
            copy_tiles(&mut cursor, &descriptor, &tiles, 1, 1, &mut raster, &mut NoopListener),
            Err(TiffError::UnsupportedOperation(_))
        ));
    }
}
