//! Reader configuration

/// Default cursor buffer size in bytes
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Default limit on the number of directories followed in one file
pub const DEFAULT_MAX_DIRECTORIES: usize = 65_536;

/// Tuning knobs for a [`TiffReader`](crate::tiff::reader::TiffReader)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Initial size of the byte window; it grows when a single request needs more
    pub buffer_capacity: usize,
    /// Directory chains longer than this are rejected as malformed
    pub max_directories: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_directories: DEFAULT_MAX_DIRECTORIES,
        }
    }
}

impl ReaderConfig {
    pub fn with_buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes;
        self
    }

    pub fn with_max_directories(mut self, count: usize) -> Self {
        self.max_directories = count;
        self
    }
}
