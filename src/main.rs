use clap::{Arg, ArgAction, Command as ClapCommand};
use log::{error, LevelFilter};
use std::process;

use rawtiff::commands::{CommandFactory, RawtiffCommandFactory};

fn main() {
    let matches = ClapCommand::new("rawtiff")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Inspect and decode uncompressed TIFF/BigTIFF rasters")
        .arg(
            Arg::new("input")
                .help("Input TIFF file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("extract")
                .short('e')
                .long("extract")
                .help("Extract image data")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("image")
                .long("image")
                .help("Index of the image to extract")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .help("Pixel region to extract (x,y,width,height)")
                .value_name("REGION")
                .required(false),
        )
        .arg(
            Arg::new("subsample")
                .long("subsample")
                .help("Keep every kx-th column and ky-th row (kx,ky)")
                .value_name("KX,KY")
                .required(false),
        )
        .arg(
            Arg::new("array-format")
                .long("array-format")
                .help("Write raw sample values instead of an image (csv)")
                .value_name("FORMAT")
                .required(false),
        )
        .arg(
            Arg::new("buffer-size")
                .long("buffer-size")
                .help("Read buffer size in bytes")
                .value_name("BYTES")
                .required(false),
        )
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let factory = RawtiffCommandFactory::new();

    match factory.create_command(&matches) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
