//! Transcoder CLI Library
//!
//! A terminal front end for ffmpeg that converts containers, extracts audio
//! and inspects media files. All untrusted input passes a whitelist-based
//! security policy before it can reach an encoder argument vector, and
//! commands are spawned directly, never through a shell.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod security;
pub mod utils;

// Re-export commonly used types
pub use adapters::AppConfig;
pub use engine::{CommandBuilder, EncoderCommand, ProgressMonitor};
pub use error::{TranscodeError, TranscodeResult, ValidationError};
pub use planner::strategy::CodecSelector;
pub use planner::{CodecDecision, Container, CustomParameters, Preset};
pub use probe::MediaInfo;
pub use security::SecurityPolicy;
