//! Reader for uncompressed TIFF and BigTIFF rasters
//!
//! Directories are parsed on demand and pixels are copied tile by tile
//! straight from the input into a typed [`Raster`], optionally restricted to a
//! region, subsampled, or both.

pub mod io;
pub mod tiff;
pub mod extractor;
pub mod commands;
pub mod utils;

pub use tiff::{ByteOrder, ErrorKind, ImageDescriptor, ReaderConfig, SampleKind, TiffError, TiffReader, TiffResult};
pub use extractor::{NoopListener, Raster, RasterData, ReadListener, ReadParam, ReadStatus, Region};
