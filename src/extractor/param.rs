//! Read parameters: source region, subsampling and band selection

use crate::extractor::region::Region;
use crate::tiff::descriptor::ImageDescriptor;
use crate::tiff::errors::{TiffError, TiffResult};

/// What to read from an image
///
/// The default reads the whole image at full resolution with all bands in
/// file order. Band selection applies to RGB images only; grayscale
/// (BlackIsZero) files are refused when their directory is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadParam {
    /// Source rectangle, the whole image when `None`
    pub region: Option<Region>,
    /// Keep every n-th column
    pub x_subsampling: u32,
    /// Keep every n-th row
    pub y_subsampling: u32,
    /// Source bands to read
    pub source_bands: Option<Vec<usize>>,
    /// Destination bands to write them to
    pub destination_bands: Option<Vec<usize>>,
}

impl Default for ReadParam {
    fn default() -> Self {
        ReadParam {
            region: None,
            x_subsampling: 1,
            y_subsampling: 1,
            source_bands: None,
            destination_bands: None,
        }
    }
}

/// A read request checked against an image descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRead {
    pub source: Region,
    pub x_subsampling: u32,
    pub y_subsampling: u32,
    /// Width of the destination raster
    pub dest_width: u32,
    /// Height of the destination raster
    pub dest_height: u32,
}

impl ReadParam {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_subsampling(mut self, x_subsampling: u32, y_subsampling: u32) -> Self {
        self.x_subsampling = x_subsampling;
        self.y_subsampling = y_subsampling;
        self
    }

    pub fn with_source_bands(mut self, bands: Vec<usize>) -> Self {
        self.source_bands = Some(bands);
        self
    }

    pub fn with_destination_bands(mut self, bands: Vec<usize>) -> Self {
        self.destination_bands = Some(bands);
        self
    }

    /// Validates the request against `descriptor` and derives the output size
    ///
    /// Band lists may only restate the identity mapping; any index at or past
    /// the sample count is out of bounds, any reordering is unsupported.
    pub fn resolve(&self, descriptor: &ImageDescriptor) -> TiffResult<ResolvedRead> {
        if self.x_subsampling == 0 || self.y_subsampling == 0 {
            return Err(TiffError::UnsupportedOperation(format!(
                "Subsampling must be at least 1, got {},{}",
                self.x_subsampling, self.y_subsampling
            )));
        }

        let bands = descriptor.samples_per_pixel as usize;
        check_bands("source band", self.source_bands.as_deref(), bands)?;
        check_bands("destination band", self.destination_bands.as_deref(), bands)?;

        let source = self.region.unwrap_or_else(|| Region::full(descriptor.width, descriptor.height));
        source.validate_within(descriptor.width, descriptor.height)?;

        Ok(ResolvedRead {
            source,
            x_subsampling: self.x_subsampling,
            y_subsampling: self.y_subsampling,
            dest_width: source.width.div_ceil(self.x_subsampling),
            dest_height: source.height.div_ceil(self.y_subsampling),
        })
    }
}

fn check_bands(what: &'static str, selection: Option<&[usize]>, bands: usize) -> TiffResult<()> {
    let Some(selection) = selection else {
        return Ok(());
    };

    if let Some(&index) = selection.iter().find(|&&index| index >= bands) {
        return Err(TiffError::IndexOutOfBounds { what, index, limit: bands });
    }

    let identity = selection.len() == bands && selection.iter().enumerate().all(|(i, &b)| i == b);
    if !identity {
        return Err(TiffError::UnsupportedOperation(format!(
            "Band remapping {:?} is not supported, only all {} bands in file order",
            selection, bands
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::types::SampleKind;

    fn rgb_descriptor() -> ImageDescriptor {
        ImageDescriptor {
            width: 10,
            height: 7,
            tile_width: 4,
            tile_height: 4,
            samples_per_pixel: 3,
            bits_per_sample: vec![8, 8, 8],
            sample_kind: SampleKind::U8,
            tile_offsets: vec![0; 6],
            tiled: true,
        }
    }

    #[test]
    fn test_default_reads_whole_image() {
        let resolved = ReadParam::default().resolve(&rgb_descriptor()).unwrap();
        assert_eq!(resolved.source, Region::new(0, 0, 10, 7));
        assert_eq!((resolved.dest_width, resolved.dest_height), (10, 7));
    }

    #[test]
    fn test_subsampled_size_rounds_up() {
        let resolved = ReadParam::new().with_subsampling(3, 2).resolve(&rgb_descriptor()).unwrap();
        assert_eq!((resolved.dest_width, resolved.dest_height), (4, 4));
    }

    #[test]
    fn test_identity_bands_accepted() {
        let param = ReadParam::new().with_source_bands(vec![0, 1, 2]).with_destination_bands(vec![0, 1, 2]);
        assert!(param.resolve(&rgb_descriptor()).is_ok());
    }

    #[test]
    fn test_band_remapping_rejected() {
        let param = ReadParam::new().with_source_bands(vec![2, 1, 0]);
        assert!(matches!(param.resolve(&rgb_descriptor()), Err(TiffError::UnsupportedOperation(_))));

        let param = ReadParam::new().with_destination_bands(vec![0]);
        assert!(matches!(param.resolve(&rgb_descriptor()), Err(TiffError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_band_index_out_of_range() {
        let param = ReadParam::new().with_source_bands(vec![0, 1, 3]);
        assert!(matches!(
            param.resolve(&rgb_descriptor()),
            Err(TiffError::IndexOutOfBounds { index: 3, limit: 3, .. })
        ));
    }

    #[test]
    fn test_zero_subsampling_rejected() {
        assert!(ReadParam::new().with_subsampling(0, 1).resolve(&rgb_descriptor()).is_err());
    }
}
