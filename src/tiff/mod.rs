//! TIFF file format parsing module
//!
//! This module provides structures and functions for reading
//! uncompressed TIFF and BigTIFF format files.

pub mod errors;
pub mod config;
pub(crate) mod constants;
pub mod types;
pub mod header;
pub mod ifd;
pub mod deferred;
pub mod descriptor;
pub mod reader;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::ByteOrder;
pub use config::ReaderConfig;
pub use descriptor::ImageDescriptor;
pub use errors::{ErrorKind, TiffError, TiffResult};
pub use reader::TiffReader;
pub use types::{FileFormat, SampleKind};
