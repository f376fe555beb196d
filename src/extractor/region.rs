//! Region structure for defining extraction area
//!
//! This module defines the Region structure that specifies a rectangular
//! area of an image for extraction. The coordinates are in pixels and
//! follow the typical image coordinate system where (0,0) is the top-left
//! corner of the image.

use crate::tiff::errors::{TiffError, TiffResult};

/// Region for image extraction (in pixel coordinates)
///
/// Represents a rectangular area defined by its top-left corner coordinates
/// and dimensions. Also used for the destination rectangle a tile maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: u32,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: u32,

    /// Width of the region in pixels
    pub width: u32,

    /// Height of the region in pixels
    pub height: u32,
}

impl Region {
    /// Create a new region
    ///
    /// # Arguments
    /// * `x` - X-coordinate of the top-left corner
    /// * `y` - Y-coordinate of the top-left corner
    /// * `width` - Width of the region in pixels
    /// * `height` - Height of the region in pixels
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Region { x, y, width, height }
    }

    /// Region covering a whole image
    pub fn full(width: u32, height: u32) -> Self {
        Region { x: 0, y: 0, width, height }
    }

    /// Get the rightmost X coordinate (exclusive)
    pub fn end_x(&self) -> u32 {
        self.x + self.width
    }

    /// Get the bottommost Y coordinate (exclusive)
    pub fn end_y(&self) -> u32 {
        self.y + self.height
    }

    /// Number of pixels in the region
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Parses a region from an `x,y,width,height` string
    ///
    /// # Arguments
    /// * `text` - Four comma-separated non-negative integers
    ///
    /// # Returns
    /// The parsed region, or a format error naming the bad input
    pub fn parse(text: &str) -> TiffResult<Self> {
        let parts: Vec<u32> = text
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| TiffError::FormatError(format!("Invalid region '{}', expected x,y,width,height", text)))?;

        match parts.as_slice() {
            [x, y, width, height] => Ok(Region::new(*x, *y, *width, *height)),
            _ => Err(TiffError::FormatError(format!(
                "Invalid region '{}', expected four values",
                text
            ))),
        }
    }

    /// Checks that the region is non-empty and lies inside a `width` x `height` image
    pub fn validate_within(&self, width: u32, height: u32) -> TiffResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TiffError::UnsupportedOperation(format!(
                "Empty region {}x{}",
                self.width, self.height
            )));
        }

        let end_x = self.x as u64 + self.width as u64;
        if end_x > width as u64 {
            return Err(TiffError::IndexOutOfBounds {
                what: "region column",
                index: end_x as usize - 1,
                limit: width as usize,
            });
        }

        let end_y = self.y as u64 + self.height as u64;
        if end_y > height as u64 {
            return Err(TiffError::IndexOutOfBounds {
                what: "region row",
                index: end_y as usize - 1,
                limit: height as usize,
            });
        }

        Ok(())
    }
}
