//! Per-image metadata assembled from one directory

use log::debug;
use std::fmt;

use crate::tiff::constants::{compression, photometric, planar_config, sample_format};
use crate::tiff::deferred::{ArrayTarget, DeferredArray};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{ArrayValue, RecognizedTag};
use crate::tiff::types::SampleKind;
use crate::tiff::validation;

/// Everything needed to locate and decode the pixels of one image
///
/// Stripped images are described as a single column of tiles as wide as the
/// image, `tiled` tells the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub samples_per_pixel: u32,
    /// One entry per sample, all equal
    pub bits_per_sample: Vec<u32>,
    pub sample_kind: SampleKind,
    /// Row-major, `tiles_across() * tiles_down()` entries
    pub tile_offsets: Vec<u64>,
    pub tiled: bool,
}

impl ImageDescriptor {
    /// Number of tile columns
    pub fn tiles_across(&self) -> usize {
        (self.width as usize).div_ceil(self.tile_width as usize)
    }

    /// Number of tile rows
    pub fn tiles_down(&self) -> usize {
        (self.height as usize).div_ceil(self.tile_height as usize)
    }

    /// Bytes between two horizontally adjacent pixels
    pub fn pixel_stride(&self) -> usize {
        self.samples_per_pixel as usize * self.sample_kind.size()
    }

    /// Bytes between two vertically adjacent pixels of a tile
    pub fn tile_row_stride(&self) -> usize {
        self.tile_width as usize * self.pixel_stride()
    }
}

impl fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Dimensions: {}x{}", self.width, self.height)?;
        if self.tiled {
            writeln!(f, "  Tiles: {}x{} ({} tiles)", self.tile_width, self.tile_height, self.tile_offsets.len())?;
        } else {
            writeln!(f, "  Strips: {} rows per strip ({} strips)", self.tile_height, self.tile_offsets.len())?;
        }
        writeln!(f, "  Samples per pixel: {}", self.samples_per_pixel)?;
        write!(f, "  Sample type: {} ({} bits)", self.sample_kind, self.bits_per_sample.first().copied().unwrap_or(0))
    }
}

/// Accumulates recognized tags until a directory has been fully scanned
#[derive(Debug, Default)]
pub struct DescriptorBuilder {
    width: Option<u64>,
    height: Option<u64>,
    samples_per_pixel: Option<u64>,
    bits_per_sample: Option<Vec<u64>>,
    sample_format: Option<Vec<u64>>,
    tile_width: Option<u64>,
    tile_height: Option<u64>,
    tile_offsets: Option<Vec<u64>>,
    rows_per_strip: Option<u64>,
    strip_offsets: Option<Vec<u64>>,
}

impl DescriptorBuilder {
    /// Folds one tag into the builder
    ///
    /// Validation tags are checked immediately. Out-of-line arrays are pushed
    /// onto `deferred`.
    pub fn apply(&mut self, tag: RecognizedTag, deferred: &mut Vec<DeferredArray>) -> TiffResult<()> {
        match tag {
            RecognizedTag::Width(v) => self.width = Some(v),
            RecognizedTag::Height(v) => self.height = Some(v),
            RecognizedTag::SamplesPerPixel(v) => self.samples_per_pixel = Some(v),
            RecognizedTag::TileWidth(v) => self.tile_width = Some(v),
            RecognizedTag::TileHeight(v) => self.tile_height = Some(v),
            RecognizedTag::RowsPerStrip(v) => self.rows_per_strip = Some(v),
            RecognizedTag::Compression(v) => validation::validate_supported("compression", v, compression::NONE)?,
            RecognizedTag::PhotometricInterpretation(v) => {
                validation::validate_supported("photometricInterpretation", v, photometric::RGB)?
            }
            RecognizedTag::PlanarConfiguration(v) => {
                validation::validate_supported("planarConfiguration", v, planar_config::CHUNKY)?
            }
            RecognizedTag::BitsPerSample(value) => self.accept_array(ArrayTarget::BitsPerSample, value, deferred),
            RecognizedTag::SampleFormat(value) => self.accept_array(ArrayTarget::SampleFormat, value, deferred),
            RecognizedTag::TileOffsets(value) => self.accept_array(ArrayTarget::TileOffsets, value, deferred),
            RecognizedTag::StripOffsets(value) => self.accept_array(ArrayTarget::StripOffsets, value, deferred),
            RecognizedTag::Unrecognized(_) => {}
        }
        Ok(())
    }

    fn accept_array(&mut self, target: ArrayTarget, value: ArrayValue, deferred: &mut Vec<DeferredArray>) {
        match value {
            ArrayValue::Inline(values) => self.set_array(target, values),
            ArrayValue::Deferred(mut array) => {
                array.target = target;
                deferred.push(array);
            }
        }
    }

    /// Stores the values of an array field, inline or resolved from disk
    pub fn set_array(&mut self, target: ArrayTarget, values: Vec<u64>) {
        match target {
            ArrayTarget::BitsPerSample => self.bits_per_sample = Some(values),
            ArrayTarget::SampleFormat => self.sample_format = Some(values),
            ArrayTarget::TileOffsets => self.tile_offsets = Some(values),
            ArrayTarget::StripOffsets => self.strip_offsets = Some(values),
        }
    }

    /// Checks that every mandatory field is present and consistent
    pub fn build(self) -> TiffResult<ImageDescriptor> {
        let width = validation::positive_u32("width", self.width.ok_or(TiffError::MissingField("width"))?)?;
        let height = validation::positive_u32("height", self.height.ok_or(TiffError::MissingField("height"))?)?;
        let samples_per_pixel = validation::positive_u32(
            "samplesPerPixel",
            self.samples_per_pixel.ok_or(TiffError::MissingField("samplesPerPixel"))?,
        )?;

        let tiled = self.tile_offsets.is_some() || self.tile_width.is_some() || self.tile_height.is_some();
        let (tile_width, tile_height, tile_offsets) = if tiled {
            let tile_width = self.tile_width.ok_or(TiffError::MissingField("tileWidth"))?;
            let tile_height = self.tile_height.ok_or(TiffError::MissingField("tileHeight"))?;
            let offsets = self.tile_offsets.ok_or(TiffError::MissingField("tileOffsets"))?;
            (
                validation::positive_u32("tileWidth", tile_width)?,
                validation::positive_u32("tileHeight", tile_height)?,
                offsets,
            )
        } else {
            let offsets = self.strip_offsets.ok_or(TiffError::MissingField("tileOffsets"))?;
            let rows_per_strip = self.rows_per_strip.unwrap_or(height as u64).clamp(1, height as u64);
            (width, rows_per_strip as u32, offsets)
        };

        let bits_per_sample = match self.bits_per_sample {
            Some(bits) => validation::uniform_bits_per_sample(&bits, samples_per_pixel)?,
            None => {
                debug!("No bitsPerSample tag, assuming 8 bits per sample");
                vec![8; samples_per_pixel as usize]
            }
        };

        let format = match self.sample_format {
            Some(formats) => validation::uniform_value("sampleFormat", &formats)?,
            None => sample_format::UNSIGNED,
        };
        let sample_kind = SampleKind::from_format(bits_per_sample[0], format)?;

        validation::validate_tile_count(width, height, tile_width, tile_height, tile_offsets.len())?;

        Ok(ImageDescriptor {
            width,
            height,
            tile_width,
            tile_height,
            samples_per_pixel,
            bits_per_sample,
            sample_kind,
            tile_offsets,
            tiled,
        })
    }
}
