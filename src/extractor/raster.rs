//! Typed destination rasters
//!
//! A [`Raster`] holds pixel-interleaved samples in one typed vector, chosen
//! by the [`SampleKind`] of the image it is filled from.

use crate::tiff::types::SampleKind;

/// Backing storage of a raster, one variant per sample kind
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl RasterData {
    /// Allocates `len` zeroed samples of the given kind
    pub fn zeroed(kind: SampleKind, len: usize) -> Self {
        match kind {
            SampleKind::U8 => RasterData::U8(vec![0; len]),
            SampleKind::I8 => RasterData::I8(vec![0; len]),
            SampleKind::U16 => RasterData::U16(vec![0; len]),
            SampleKind::I16 => RasterData::I16(vec![0; len]),
            SampleKind::U32 => RasterData::U32(vec![0; len]),
            SampleKind::I32 => RasterData::I32(vec![0; len]),
            SampleKind::F32 => RasterData::F32(vec![0.0; len]),
            SampleKind::F64 => RasterData::F64(vec![0.0; len]),
        }
    }

    /// Sample kind stored in this buffer
    pub fn kind(&self) -> SampleKind {
        match self {
            RasterData::U8(_) => SampleKind::U8,
            RasterData::I8(_) => SampleKind::I8,
            RasterData::U16(_) => SampleKind::U16,
            RasterData::I16(_) => SampleKind::I16,
            RasterData::U32(_) => SampleKind::U32,
            RasterData::I32(_) => SampleKind::I32,
            RasterData::F32(_) => SampleKind::F32,
            RasterData::F64(_) => SampleKind::F64,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        match self {
            RasterData::U8(v) => v.len(),
            RasterData::I8(v) => v.len(),
            RasterData::U16(v) => v.len(),
            RasterData::I16(v) => v.len(),
            RasterData::U32(v) => v.len(),
            RasterData::I32(v) => v.len(),
            RasterData::F32(v) => v.len(),
            RasterData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads sample `index` widened to f64
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            RasterData::U8(v) => v.get(index).map(|&s| s as f64),
            RasterData::I8(v) => v.get(index).map(|&s| s as f64),
            RasterData::U16(v) => v.get(index).map(|&s| s as f64),
            RasterData::I16(v) => v.get(index).map(|&s| s as f64),
            RasterData::U32(v) => v.get(index).map(|&s| s as f64),
            RasterData::I32(v) => v.get(index).map(|&s| s as f64),
            RasterData::F32(v) => v.get(index).map(|&s| s as f64),
            RasterData::F64(v) => v.get(index).copied(),
        }
    }
}

/// A pixel-interleaved image buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel
    pub bands: u32,
    pub data: RasterData,
}

impl Raster {
    /// Allocates a zero-filled raster
    ///
    /// This is the default destination allocator used by `TiffReader::read`.
    pub fn allocate(width: u32, height: u32, kind: SampleKind, bands: u32) -> Self {
        let len = width as usize * height as usize * bands as usize;
        Raster { width, height, bands, data: RasterData::zeroed(kind, len) }
    }

    pub fn sample_kind(&self) -> SampleKind {
        self.data.kind()
    }

    /// Index of the first sample of pixel (x, y)
    pub fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.bands as usize
    }

    /// Reads one sample widened to f64, `None` outside the raster
    pub fn sample_f64(&self, x: u32, y: u32, band: u32) -> Option<f64> {
        if x >= self.width || y >= self.height || band >= self.bands {
            return None;
        }
        self.data.get_f64(self.pixel_index(x, y) + band as usize)
    }

    /// Minimum and maximum over all samples, ignoring NaN
    pub fn value_range(&self) -> Option<(f64, f64)> {
        (0..self.data.len())
            .filter_map(|i| self.data.get_f64(i))
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_matches_kind_and_size() {
        let raster = Raster::allocate(3, 2, SampleKind::I16, 4);
        assert_eq!(raster.sample_kind(), SampleKind::I16);
        assert_eq!(raster.data.len(), 24);
    }

    #[test]
    fn test_sample_f64_widens_unsigned() {
        let mut raster = Raster::allocate(2, 1, SampleKind::U16, 1);
        if let RasterData::U16(v) = &mut raster.data {
            v[1] = 65535;
        }
        assert_eq!(raster.sample_f64(1, 0, 0), Some(65535.0));
        assert_eq!(raster.sample_f64(2, 0, 0), None);
    }

    #[test]
    fn test_value_range() {
        let raster = Raster {
            width: 3,
            height: 1,
            bands: 1,
            data: RasterData::F32(vec![1.5, f32::NAN, -2.0]),
        };
        assert_eq!(raster.value_range(), Some((-2.0, 1.5)));
    }
}
