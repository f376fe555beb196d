//! TIFF format constants
//!
//! Numeric codes used by the header, directory entries and the handful of
//! tags this reader understands.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 0x2A;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 0x2B;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// "MM" byte order marker for big-endian
    pub const BIG_ENDIAN_MARKER: [u8; 2] = [0x4D, 0x4D];

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;

    /// Bytes read up front to cover either header variant
    pub const HEADER_WINDOW: usize = 16;
}

/// Field types as defined by TIFF 6.0 and BigTIFF
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const IFD: u16 = 13;       // 32-bit IFD offset
    pub const LONG8: u16 = 16;     // BigTIFF 64-bit unsigned integer
    pub const SLONG8: u16 = 17;    // BigTIFF 64-bit signed integer
    pub const IFD8: u16 = 18;      // BigTIFF 64-bit IFD offset
}

/// Tags read by the directory parser
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 0x0100;                // Width of the image in pixels
    pub const IMAGE_LENGTH: u16 = 0x0101;               // Height of the image in pixels
    pub const BITS_PER_SAMPLE: u16 = 0x0102;            // Bits per component
    pub const COMPRESSION: u16 = 0x0103;                // Compression scheme
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 0x0106; // Color space of image data
    pub const STRIP_OFFSETS: u16 = 0x0111;              // Offsets to the data strips
    pub const SAMPLES_PER_PIXEL: u16 = 0x0115;          // Number of components per pixel
    pub const ROWS_PER_STRIP: u16 = 0x0116;             // Rows per strip of data
    pub const PLANAR_CONFIGURATION: u16 = 0x011C;       // How components are stored
    pub const TILE_WIDTH: u16 = 0x0142;                 // Width of a tile
    pub const TILE_LENGTH: u16 = 0x0143;                // Length of a tile
    pub const TILE_OFFSETS: u16 = 0x0144;               // Offsets to the data tiles
    pub const SAMPLE_FORMAT: u16 = 0x0153;              // Interpretation of sample data
}

/// Compression types
pub mod compression {
    pub const NONE: u64 = 1;              // No compression
}

/// Photometric interpretation values
pub mod photometric {
    pub const RGB: u64 = 2;               // RGB color model
}

/// Planar configuration values
pub mod planar_config {
    pub const CHUNKY: u64 = 1;            // Components stored interleaved (RGBRGBRGB)
}

/// Sample format values
pub mod sample_format {
    pub const UNSIGNED: u64 = 1;          // Unsigned integer data
    pub const SIGNED: u64 = 2;            // Signed integer data
    pub const IEEEFP: u64 = 3;            // IEEE floating point data
}
