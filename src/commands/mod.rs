//! CLI command implementations
//!
//! This module contains implementations of various commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;
pub mod extract_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use extract_command::ExtractCommand;

use clap::ArgMatches;
use crate::tiff::errors::TiffResult;

/// Factory for creating command instances based on CLI arguments
#[derive(Debug, Default)]
pub struct RawtiffCommandFactory;

impl RawtiffCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        RawtiffCommandFactory
    }
}

impl CommandFactory for RawtiffCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> TiffResult<Box<dyn Command>> {
        if args.get_flag("extract") {
            Ok(Box::new(ExtractCommand::new(args)?))
        } else {
            Ok(Box::new(AnalyzeCommand::new(args)?))
        }
    }
}
