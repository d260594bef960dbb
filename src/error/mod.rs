//! Error handling module for the transcoder

use thiserror::Error;

/// Verdict of a rejected untrusted value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value exceeds the configured length limit
    #[error("value too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },

    /// Value contains a character from a deny-set
    #[error("value contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },

    /// Value is not a member of the whitelist
    #[error("{kind} codec not allowed: {value}")]
    NotAllowed { kind: String, value: String },

    /// Value does not match its grammar
    #[error("invalid {what} format: {value} ({hint})")]
    InvalidFormat {
        what: &'static str,
        value: String,
        hint: &'static str,
    },

    /// Value parsed but lies outside its allowed range
    #[error("{what} out of range: {value} ({range})")]
    OutOfRange {
        what: &'static str,
        value: String,
        range: &'static str,
    },

    /// Path still escapes its base after normalization
    #[error("directory traversal detected in path: {path}")]
    Traversal { path: String },

    /// Required value is empty
    #[error("value must not be empty")]
    Empty,

    /// File extension is not a supported container or audio format
    #[error("file format not allowed: {extension:?}")]
    FormatNotAllowed { extension: String },
}

/// Coarse error classes used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Probe,
    Build,
    Execution,
    Other,
}

/// Main error type for transcoder operations
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// An untrusted parameter was rejected
    #[error("security validation failed for {field}: {source}")]
    Validation {
        field: &'static str,
        #[source]
        source: ValidationError,
    },

    /// Input file not found
    #[error("file does not exist: {path}")]
    NotFound { path: String },

    /// The prober exited non-zero or its report could not be parsed
    #[error("failed to probe media file: {message}")]
    ProbeFailed { message: String },

    /// An external program is missing or not working
    #[error("{tool} not found or not working: {message}")]
    ToolUnavailable { tool: String, message: String },

    /// Output extension is not usable for the requested operation
    #[error("unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// Audio extraction requested from a file without audio
    #[error("no audio streams found in input file: {path}")]
    NoAudioStreams { path: String },

    /// Defensive re-check inside the command builder failed
    #[error("failed to build secure encoder command: {message}")]
    BuildError { message: String },

    /// The encoder failed to start or exited non-zero
    #[error("encoder execution failed: {message}")]
    ExecutionFailed {
        message: String,
        diagnostics: Option<String>,
    },

    /// The encoder exceeded its deadline and was killed
    #[error("encoder timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The operation was cancelled and the encoder was killed
    #[error("operation cancelled")]
    Cancelled,

    /// Output file exists and overwriting was not requested
    #[error("output file already exists: {path} (use --force to overwrite)")]
    OutputExists { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TranscodeError {
    /// Wrap a validation verdict with the name of the offending field
    pub fn validation(field: &'static str, source: ValidationError) -> Self {
        Self::Validation { field, source }
    }

    /// Map the error onto the reporting taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::UnsupportedFormat { .. } => ErrorCategory::Validation,
            Self::NotFound { .. }
            | Self::ProbeFailed { .. }
            | Self::NoAudioStreams { .. }
            | Self::ToolUnavailable { .. } => ErrorCategory::Probe,
            Self::BuildError { .. } => ErrorCategory::Build,
            Self::ExecutionFailed { .. } | Self::Timeout { .. } | Self::Cancelled => {
                ErrorCategory::Execution
            }
            Self::OutputExists { .. } | Self::Config { .. } | Self::Io(_) => ErrorCategory::Other,
        }
    }

    /// Captured encoder diagnostics, if the failure carried any
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailed { diagnostics, .. } => diagnostics.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias for transcoder operations
pub type TranscodeResult<T> = std::result::Result<T, TranscodeError>;
