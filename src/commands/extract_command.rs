//! Pixel extraction command
//!
//! Decodes an image, or a subsampled region of it, and writes the result as an
//! 8-bit image or as a CSV array.

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::{self, Command};
use crate::extractor::{ReadParam, Region};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::{ReaderConfig, TiffReader};
use crate::utils::progress::ProgressTracker;
use crate::utils::raster_output;

/// Output written by an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Image file, encoding picked from the extension
    Image,
    Csv,
}

/// Command for extracting pixel data from TIFF files
pub struct ExtractCommand {
    input_file: String,
    output_file: String,
    image: usize,
    param: ReadParam,
    format: OutputFormat,
    config: ReaderConfig,
}

impl ExtractCommand {
    /// Create a new extract command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    pub fn new(args: &ArgMatches) -> TiffResult<Self> {
        let input_file = command_traits::input_file(args)?;
        let output_file = args
            .get_one::<String>("output")
            .cloned()
            .ok_or_else(|| TiffError::UnsupportedOperation("Missing output file path for extraction".to_string()))?;

        let image = match args.get_one::<String>("image") {
            Some(text) => text
                .parse::<usize>()
                .map_err(|_| TiffError::UnsupportedOperation(format!("Invalid image index: {}", text)))?,
            None => 0,
        };

        let mut param = ReadParam::new();
        if let Some(text) = args.get_one::<String>("region") {
            param = param.with_region(Region::parse(text)?);
        }
        if let Some(text) = args.get_one::<String>("subsample") {
            let (x, y) = parse_subsampling(text)?;
            param = param.with_subsampling(x, y);
        }

        let format = match args.get_one::<String>("array-format").map(String::as_str) {
            None => OutputFormat::Image,
            Some("csv") => OutputFormat::Csv,
            Some(other) => {
                return Err(TiffError::UnsupportedOperation(format!("Unsupported array format: {}", other)))
            }
        };

        info!("Extracting image {} of {} to {}", image, input_file, output_file);
        Ok(ExtractCommand {
            input_file,
            output_file,
            image,
            param,
            format,
            config: command_traits::reader_config(args)?,
        })
    }
}

/// Parses `kx,ky`, or a single `k` used for both axes
fn parse_subsampling(text: &str) -> TiffResult<(u32, u32)> {
    let invalid = || TiffError::UnsupportedOperation(format!("Invalid subsampling '{}', expected kx,ky", text));
    let parts: Vec<u32> = text
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;

    match parts.as_slice() {
        [k] => Ok((*k, *k)),
        [x, y] => Ok((*x, *y)),
        _ => Err(invalid()),
    }
}

impl Command for ExtractCommand {
    fn execute(&self) -> TiffResult<()> {
        let mut reader = TiffReader::open_path(&self.input_file, self.config)?;
        let descriptor = reader.descriptor(self.image)?;
        info!(
            "Image {}: {}x{}, {} bands of {}",
            self.image, descriptor.width, descriptor.height, descriptor.samples_per_pixel, descriptor.sample_kind
        );

        let mut progress = ProgressTracker::for_read("Reading tiles");
        let raster = reader.read(self.image, &self.param, &mut progress)?;
        progress.finish();
        reader.close();

        match self.format {
            OutputFormat::Image => raster_output::save_image(&raster, &self.output_file)?,
            OutputFormat::Csv => raster_output::save_csv(&raster, &self.output_file)?,
        }

        Ok(())
    }
}
