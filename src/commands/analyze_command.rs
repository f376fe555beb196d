//! TIFF/BigTIFF structure analysis command
//!
//! Prints the file variant, byte order and a summary of every image.

use clap::ArgMatches;
use log::{debug, info};

use crate::commands::command_traits::{self, Command};
use crate::tiff::errors::TiffResult;
use crate::tiff::{ReaderConfig, TiffReader};

/// Command for analyzing TIFF file structure
pub struct AnalyzeCommand {
    /// Path to the input file
    input_file: String,
    config: ReaderConfig,
}

impl AnalyzeCommand {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        Ok(AnalyzeCommand {
            input_file: command_traits::input_file(args)?,
            config: command_traits::reader_config(args)?,
        })
    }
}

impl Command for AnalyzeCommand {
    fn execute(&self) -> TiffResult<()> {
        info!("Analyzing {}", self.input_file);
        let mut reader = TiffReader::open_path(&self.input_file, self.config)?;

        let variant = if reader.is_big_tiff()? { "BigTIFF" } else { "TIFF" };
        let byte_order = reader.byte_order()?;
        let count = reader.image_count(true)?.unwrap_or(0);

        println!("TIFF Analysis Results:");
        println!("  Format: {}", variant);
        println!("  Byte order: {}", byte_order.name());
        println!("  Number of images: {}", count);

        for index in 0..count {
            debug!("Reading descriptor of image {}", index);
            let descriptor = reader.descriptor(index)?;
            println!("\nImage #{}", index);
            println!("{}", descriptor);
        }

        reader.close();
        Ok(())
    }
}
