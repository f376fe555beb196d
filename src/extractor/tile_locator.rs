//! Mapping a source region onto the tile grid
//!
//! For every tile intersecting the requested region this computes where in
//! the destination raster its samples land and where in the file the first
//! sampled pixel lives. Tiles are returned in file order so the pixel copy
//! reads the channel front to back.

use log::debug;

use crate::extractor::region::Region;
use crate::tiff::descriptor::ImageDescriptor;
use crate::tiff::errors::{TiffError, TiffResult};

/// One tile's contribution to a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Destination rectangle, in subsampled raster coordinates
    pub dest: Region,
    /// File offset of the first sampled pixel of this tile
    pub file_position: u64,
}

/// Sampled extent of one tile along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisSpan {
    /// First sampled source coordinate
    first: u32,
    /// Destination coordinate of `first`
    dest_start: u32,
    /// Number of sampled coordinates
    dest_len: u32,
}

/// Intersects a tile `[tile_start, tile_start + tile_size)` with a region
/// `[region_start, region_end)` sampled every `step` coordinates
///
/// Returns `None` when no sampled coordinate falls inside the tile.
fn axis_span(tile_start: u32, tile_size: u32, region_start: u32, region_end: u32, step: u32) -> Option<AxisSpan> {
    let lo = tile_start.max(region_start) as u64;
    let hi = (tile_start as u64 + tile_size as u64).min(region_end as u64);
    let origin = region_start as u64;
    let step = step as u64;

    let dest_start = (lo - origin).div_ceil(step);
    let first = origin + dest_start * step;
    if first >= hi {
        return None;
    }
    let dest_end = (hi - origin).div_ceil(step);

    Some(AxisSpan {
        first: first as u32,
        dest_start: dest_start as u32,
        dest_len: (dest_end - dest_start) as u32,
    })
}

/// Enumerates the tiles covering `source`, sorted by file position
///
/// `source` must already lie within the image and subsampling factors must be
/// at least 1. A tile whose data would extend past the largest file offset is
/// a format error.
pub fn locate(
    descriptor: &ImageDescriptor,
    source: &Region,
    x_subsampling: u32,
    y_subsampling: u32,
) -> TiffResult<Vec<Tile>> {
    let tile_width = descriptor.tile_width;
    let tile_height = descriptor.tile_height;
    let pixel_stride = descriptor.pixel_stride() as u64;
    let tile_bytes = (tile_width as u64)
        .checked_mul(pixel_stride)
        .and_then(|row| row.checked_mul(tile_height as u64))
        .ok_or_else(|| TiffError::FormatError(format!("Tiles of {}x{} pixels are too large", tile_width, tile_height)))?;
    let tiles_across = descriptor.tiles_across();

    let first_column = source.x / tile_width;
    let last_column = (source.end_x() - 1) / tile_width;
    let first_row = source.y / tile_height;
    let last_row = (source.end_y() - 1) / tile_height;

    debug!(
        "Locating tiles {}..={} x {}..={} for region {:?} with subsampling {},{}",
        first_column, last_column, first_row, last_row, source, x_subsampling, y_subsampling
    );

    let columns: Vec<(u32, AxisSpan)> = (first_column..=last_column)
        .filter_map(|tx| {
            axis_span(tx * tile_width, tile_width, source.x, source.end_x(), x_subsampling).map(|span| (tx, span))
        })
        .collect();

    let mut tiles = Vec::new();
    for ty in first_row..=last_row {
        let Some(rows) = axis_span(ty * tile_height, tile_height, source.y, source.end_y(), y_subsampling) else {
            continue;
        };

        for &(tx, cols) in &columns {
            let index = ty as usize * tiles_across + tx as usize;
            let row_in_tile = (rows.first - ty * tile_height) as u64;
            let column_in_tile = (cols.first - tx * tile_width) as u64;
            let tile_offset = descriptor.tile_offsets[index];
            if tile_offset.checked_add(tile_bytes).is_none() {
                return Err(TiffError::FormatError(format!(
                    "Tile {} at offset {} extends past the end of the addressable file",
                    index, tile_offset
                )));
            }

            tiles.push(Tile {
                dest: Region::new(cols.dest_start, rows.dest_start, cols.dest_len, rows.dest_len),
                file_position: tile_offset + (row_in_tile * tile_width as u64 + column_in_tile) * pixel_stride,
            });
        }
    }

    tiles.sort_by_key(|tile| tile.file_position);
    debug!("{} tiles intersect the region", tiles.len());
    Ok(tiles)
}
