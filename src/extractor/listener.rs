//! Progress and cancellation hooks for pixel reads

/// Receives progress updates and can request cancellation
///
/// The copy loop polls [`ReadListener::abort_requested`] at every row.
pub trait ReadListener {
    /// Called after each tile with the completed percentage (0 to 100)
    fn progress(&mut self, _percent: f32) {}

    /// Whether the current read should stop early
    fn abort_requested(&self) -> bool {
        false
    }

    /// Called once when a read stops because of an abort request
    fn read_aborted(&mut self) {}
}

/// Listener that ignores progress and never aborts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ReadListener for NoopListener {}

/// Outcome of a read that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Every requested pixel was written
    Complete,
    /// The listener requested an abort; the raster is partially filled
    Aborted,
}
