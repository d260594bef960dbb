//! CLI module for the transcoder
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;
use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

pub use args::{ConvertArgs, ExtractArgs, InfoArgs, ProgressFormat};

/// Secure ffmpeg front end
///
/// Converts between video containers, extracts audio tracks and inspects
/// media files. Every parameter is validated against a strict whitelist
/// before an encoder process is started.
#[derive(Parser, Debug)]
#[command(name = "transcoder")]
#[command(about = "Secure media conversion and inspection on top of ffmpeg")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: transcoder.toml, then config/transcoder.toml)
    #[arg(long, global = true, env = "TRANSCODER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Show the encoder command and its raw output instead of a progress bar
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress and summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a media file to another container
    Convert(ConvertArgs),
    /// Extract the audio track of a media file
    Extract(ExtractArgs),
    /// Show information about a media file
    Info(InfoArgs),
}

impl From<&Cli> for ConfigOverrides {
    fn from(cli: &Cli) -> Self {
        let log_level = match (&cli.log_level, cli.verbose) {
            (Some(level), _) => Some(level.clone()),
            (None, true) => Some("info".to_string()),
            (None, false) => None,
        };

        Self {
            config_file: cli.config.clone(),
            log_level,
            log_format: cli.log_format,
        }
    }
}
