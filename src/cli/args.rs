//! Command-line argument definitions

use clap::{Args, ValueEnum};

use crate::app::InspectFormat;
use crate::planner::audio::ExtractParameters;
use crate::planner::{CustomParameters, Preset};

/// How encoder progress is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProgressFormat {
    /// Progress bar redrawn in place
    #[default]
    Console,
    /// One JSON event per line
    Json,
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input media file
    pub input: String,

    /// Output file; the extension selects the container
    pub output: String,

    /// Quality preset (disables stream copy when given)
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Video codec
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Audio codec
    #[arg(long)]
    pub audio_codec: Option<String>,

    /// Video bitrate (e.g. 2M, 2500k)
    #[arg(long)]
    pub video_bitrate: Option<String>,

    /// Audio bitrate (e.g. 192k)
    #[arg(long)]
    pub audio_bitrate: Option<String>,

    /// Output resolution as WIDTHxHEIGHT
    #[arg(long)]
    pub resolution: Option<String>,

    /// Output frame rate
    #[arg(long)]
    pub framerate: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Progress output
    #[arg(long, value_enum, default_value_t = ProgressFormat::Console)]
    pub progress: ProgressFormat,
}

impl ConvertArgs {
    /// Custom encoding parameters given on the command line
    pub fn custom_parameters(&self) -> CustomParameters {
        CustomParameters {
            video_codec: self.video_codec.clone(),
            audio_codec: self.audio_codec.clone(),
            video_bitrate: self.video_bitrate.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
            resolution: self.resolution.clone(),
            framerate: self.framerate.clone(),
        }
    }
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input media file
    pub input: String,

    /// Output audio file; the extension selects the codec
    pub output: String,

    /// Quality preset
    #[arg(long, value_enum)]
    pub quality: Option<Preset>,

    /// Audio codec
    #[arg(long)]
    pub codec: Option<String>,

    /// Audio bitrate (e.g. 192k)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<String>,

    /// Channel count (1, 2, 6 or 8)
    #[arg(long)]
    pub channels: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,

    /// Progress output
    #[arg(long, value_enum, default_value_t = ProgressFormat::Console)]
    pub progress: ProgressFormat,
}

impl ExtractArgs {
    /// Extraction overrides given on the command line
    pub fn parameters(&self) -> ExtractParameters {
        ExtractParameters {
            codec: self.codec.clone(),
            bitrate: self.bitrate.clone(),
            sample_rate: self.sample_rate.clone(),
            channels: self.channels.clone(),
        }
    }
}

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input media file
    pub input: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = InspectFormat::Text)]
    pub format: InspectFormat,

    /// Include technical details
    #[arg(short, long)]
    pub detailed: bool,

    /// Write the report to a file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Overwrite the report file if it exists
    #[arg(short, long, requires = "output")]
    pub force: bool,
}
