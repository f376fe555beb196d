//! Writing decoded rasters to disk
//!
//! Rasters become 8-bit images through the `image` crate, or plain CSV of the
//! raw sample values.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::extractor::raster::{Raster, RasterData};
use crate::tiff::errors::{TiffError, TiffResult};

/// Converts a raster to an 8-bit image
///
/// 8-bit unsigned data is used as-is; every other kind is linearly stretched
/// from its value range onto 0..=255. One band gives grayscale, three RGB,
/// four RGBA; any other band count keeps only the first band.
pub fn to_image(raster: &Raster) -> TiffResult<DynamicImage> {
    let samples = to_u8_samples(raster);
    let (width, height, bands) = (raster.width, raster.height, raster.bands as usize);

    let image = match bands {
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        _ => {
            debug!("Keeping band 0 of {} for image output", bands);
            let first: Vec<u8> = samples.chunks_exact(bands).map(|pixel| pixel[0]).collect();
            GrayImage::from_raw(width, height, first).map(DynamicImage::ImageLuma8)
        }
    };

    image.ok_or_else(|| TiffError::UnsupportedOperation(format!("Cannot build a {}x{} image", width, height)))
}

fn to_u8_samples(raster: &Raster) -> Vec<u8> {
    if let RasterData::U8(data) = &raster.data {
        return data.clone();
    }

    let (min, max) = raster.value_range().unwrap_or((0.0, 0.0));
    let span = if max > min { max - min } else { 1.0 };
    info!("Stretching {} samples from [{}, {}] to 8 bits", raster.sample_kind(), min, max);

    (0..raster.data.len())
        .map(|i| match raster.data.get_f64(i) {
            Some(v) if !v.is_nan() => ((v - min) / span * 255.0).round().clamp(0.0, 255.0) as u8,
            _ => 0,
        })
        .collect()
}

/// Saves a raster as an image, format chosen from the file extension
pub fn save_image(raster: &Raster, path: &str) -> TiffResult<()> {
    let image = to_image(raster)?;
    image.save(path)?;
    info!("Saved {}x{} image to {}", raster.width, raster.height, path);
    Ok(())
}

/// Writes raw sample values as CSV, one row per raster row
///
/// Multi-band pixels are written as `a;b;c` within one cell.
pub fn write_csv<W: Write>(raster: &Raster, writer: &mut W) -> TiffResult<()> {
    write!(writer, "row/col")?;
    for x in 0..raster.width {
        write!(writer, ",{}", x)?;
    }
    writeln!(writer)?;

    for y in 0..raster.height {
        write!(writer, "{}", y)?;
        for x in 0..raster.width {
            let cell: Vec<String> = (0..raster.bands)
                .map(|band| raster.sample_f64(x, y, band).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            write!(writer, ",{}", cell.join(";"))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Saves a raster as CSV
pub fn save_csv(raster: &Raster, path: &str) -> TiffResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(raster, &mut writer)?;
    writer.flush()?;
    info!("Saved {}x{} array to {}", raster.width, raster.height, path);
    Ok(())
}
