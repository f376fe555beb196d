//! Utility modules for common functionality
//!
//! Output writers and terminal progress used by the command-line tool.

pub mod progress;
pub mod raster_output;
