use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coordinate-converter")]
#[command(about = "Convert coordinates between DMS, decimal degrees, MGRS and plus codes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file [default: coordinate-converter.toml if present]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Digits in generated plus codes")]
    pub pluscode_length: Option<usize>,

    #[arg(long, global = true, help = "Digits per axis in generated MGRS references")]
    pub mgrs_precision: Option<u8>,

    #[arg(
        long,
        global = true,
        help = "Reject DMS values without a hemisphere letter or sign"
    )]
    pub strict_hemisphere: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a single coordinate
    Convert {
        #[arg(help = "Coordinates in the source format, e.g. \"48.8861 2.3430\"")]
        coordinates: String,

        #[arg(short, long, help = "Source format (dms, dd, mgrs, pluscode)")]
        from: String,

        #[arg(short, long, help = "Destination format (dms, dd, mgrs, pluscode)")]
        to: String,
    },

    /// Handle a JSON request body like {"coordinates": ..., "from": ..., "to": ...}
    Request {
        #[arg(help = "JSON request body; read from stdin when omitted")]
        json: Option<String>,
    },

    /// Convert a file of JSON requests, one per line
    Batch {
        #[arg(short, long, help = "Input file with one JSON request per line")]
        input: PathBuf,

        #[arg(short, long, help = "Output file [default: stdout]")]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// List supported formats and their names
    Formats,
}
