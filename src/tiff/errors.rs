//! Custom error types for TIFF processing

use std::fmt;
use std::io;

/// Broad classification of a [`TiffError`]
///
/// Useful for callers that only care whether a file is malformed, a page is
/// missing, or the underlying channel failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file violates the format or uses an unsupported feature
    Format,
    /// A mandatory tag was absent from a directory
    MissingField,
    /// A page or band index is out of range
    Bounds,
    /// The underlying channel reported an error
    Io,
    /// The channel ended before the requested bytes could be read
    EndOfStream,
    /// The caller asked for something the reader refuses to do
    UnsupportedOperation,
}

/// TIFF-specific error types
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// The channel was exhausted before `needed` bytes were available at `position`
    EndOfStream {
        position: u64,
        needed: usize,
        available: usize,
    },
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Invalid BigTIFF header
    InvalidBigTiffHeader { offset_size: u16, reserved: u16 },
    /// A validation tag holds a value this reader does not handle
    UnsupportedValue { field: &'static str, value: u64 },
    /// Unsupported or unknown field data type for a recognized tag
    UnsupportedDataType { field: &'static str, data_type: u16 },
    /// Any other structural problem with the file
    FormatError(String),
    /// A mandatory tag is absent
    MissingField(&'static str),
    /// Page or band index outside the valid range
    IndexOutOfBounds {
        what: &'static str,
        index: usize,
        limit: usize,
    },
    /// Explicitly rejected request
    UnsupportedOperation(String),
}

impl TiffError {
    /// Returns the broad classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TiffError::IoError(_) => ErrorKind::Io,
            TiffError::EndOfStream { .. } => ErrorKind::EndOfStream,
            TiffError::InvalidByteOrder(_)
            | TiffError::UnsupportedVersion(_)
            | TiffError::InvalidBigTiffHeader { .. }
            | TiffError::UnsupportedValue { .. }
            | TiffError::UnsupportedDataType { .. }
            | TiffError::FormatError(_) => ErrorKind::Format,
            TiffError::MissingField(_) => ErrorKind::MissingField,
            TiffError::IndexOutOfBounds { .. } => ErrorKind::Bounds,
            TiffError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
        }
    }

    /// Name of the TIFF field this error is about, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            TiffError::UnsupportedValue { field, .. }
            | TiffError::UnsupportedDataType { field, .. }
            | TiffError::MissingField(field) => Some(field),
            _ => None,
        }
    }
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::EndOfStream { position, needed, available } => write!(
                f,
                "Unexpected end of stream at offset {}: needed {} bytes, got {}",
                position, needed, available
            ),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::InvalidBigTiffHeader { offset_size, reserved } => write!(
                f,
                "Invalid BigTIFF header: offset size {} (expected 8), reserved {} (expected 0)",
                offset_size, reserved
            ),
            TiffError::UnsupportedValue { field, value } => {
                write!(f, "Unsupported {} value: {}", field, value)
            }
            TiffError::UnsupportedDataType { field, data_type } => {
                write!(f, "Unsupported data type {} for {}", data_type, field)
            }
            TiffError::FormatError(msg) => write!(f, "TIFF format error: {}", msg),
            TiffError::MissingField(field) => write!(f, "Missing mandatory field: {}", field),
            TiffError::IndexOutOfBounds { what, index, limit } => {
                write!(f, "{} index {} out of bounds (limit {})", what, index, limit)
            }
            TiffError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<image::ImageError> for TiffError {
    fn from(error: image::ImageError) -> Self {
        TiffError::IoError(io::Error::new(io::ErrorKind::Other, error))
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(TiffError::MissingField("tileOffsets").kind(), ErrorKind::MissingField);
        assert_eq!(
            TiffError::UnsupportedValue { field: "compression", value: 5 }.kind(),
            ErrorKind::Format
        );
        assert_eq!(
            TiffError::IndexOutOfBounds { what: "Image", index: 3, limit: 1 }.kind(),
            ErrorKind::Bounds
        );
    }

    #[test]
    fn test_display_names_field() {
        let err = TiffError::UnsupportedValue { field: "compression", value: 5 };
        assert!(err.to_string().contains("compression"));
        assert_eq!(err.field(), Some("compression"));
    }
}
