//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application, enabling a clean separation of concerns.

use clap::ArgMatches;

use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ReaderConfig;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    fn execute(&self) -> TiffResult<()>;
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    fn create_command(&self, args: &ArgMatches) -> TiffResult<Box<dyn Command>>;
}

/// Reader configuration shared by all commands
pub(crate) fn reader_config(args: &ArgMatches) -> TiffResult<ReaderConfig> {
    let mut config = ReaderConfig::default();
    if let Some(size) = args.get_one::<String>("buffer-size") {
        let bytes = size.parse::<usize>().ok().filter(|b| *b > 0).ok_or_else(|| {
            TiffError::UnsupportedOperation(format!("Invalid buffer size: {}", size))
        })?;
        config = config.with_buffer_capacity(bytes);
    }
    Ok(config)
}

/// Required input path argument
pub(crate) fn input_file(args: &ArgMatches) -> TiffResult<String> {
    args.get_one::<String>("input")
        .cloned()
        .ok_or_else(|| TiffError::UnsupportedOperation("Missing input file".to_string()))
}
