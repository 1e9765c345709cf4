//! Scenecast CLI — offline processing for finished recordings.
//!
//! Usage:
//!   scenecast check                 Check encoder capabilities
//!   scenecast trim <INPUT>          Trim a recording to a sub-range
//!   scenecast still <INPUT>         Capture a single frame
//!   scenecast crop-clip <INPUT>     Extract a crop region as its own clip
//!   scenecast redact <INPUT>        Apply redaction and re-bake a watermark

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scenecast",
    about = "Multi-source compositing recorder: offline processing jobs",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check encoder capabilities
    Check,

    /// Trim a recording to [start, end)
    Trim {
        /// Path to the recording
        input: PathBuf,

        /// Output file path (extension follows the selected container)
        #[arg(short, long)]
        output: PathBuf,

        /// Range start in seconds
        #[arg(long)]
        start: f64,

        /// Range end in seconds
        #[arg(long)]
        end: f64,
    },

    /// Capture a single frame as a still image
    Still {
        /// Path to the recording
        input: PathBuf,

        /// Output image path (.png or .jpg)
        #[arg(short, long)]
        output: PathBuf,

        /// Capture time in seconds
        #[arg(long, default_value = "0.0")]
        at: f64,

        /// Source crop rectangle as x,y,w,h (pixels)
        #[arg(long)]
        crop: Option<String>,

        /// Output size as WxH
        #[arg(long)]
        size: Option<String>,
    },

    /// Extract a crop region of every frame into a downstream-ready clip
    CropClip {
        /// Path to the recording
        input: PathBuf,

        /// Output file path (extension follows the selected container)
        #[arg(short, long)]
        output: PathBuf,

        /// Crop rectangle as x,y,w,h (pixels on the recorded canvas)
        #[arg(long)]
        crop: String,
    },

    /// Re-encode with redaction effects and/or a burned-in watermark
    Redact {
        /// Path to the recording
        input: PathBuf,

        /// Output file path (extension follows the selected container)
        #[arg(short, long)]
        output: PathBuf,

        /// Black out the top PCT percent of every frame
        #[arg(long, value_name = "PCT")]
        crop_band: Option<f64>,

        /// Pixelate a region, given as x,y,w,h,block
        #[arg(long)]
        mosaic: Option<String>,

        /// Watermark text to burn into every frame
        #[arg(long)]
        watermark: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = scenecast_common::config::AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    scenecast_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Check => commands::check::run(&config),
        Commands::Trim {
            input,
            output,
            start,
            end,
        } => commands::trim::run(&config, input, output, start, end),
        Commands::Still {
            input,
            output,
            at,
            crop,
            size,
        } => commands::still::run(input, output, at, crop, size),
        Commands::CropClip {
            input,
            output,
            crop,
        } => commands::crop_clip::run(&config, input, output, crop),
        Commands::Redact {
            input,
            output,
            crop_band,
            mosaic,
            watermark,
        } => commands::redact::run(&config, input, output, crop_band, mosaic, watermark),
    }
}
