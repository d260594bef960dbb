//! Input security policy
//!
//! Every untrusted value that can end up in an encoder argument vector is
//! checked here first. The policy is an immutable value built once at startup
//! and passed by reference into each validation call; the whitelists are
//! closed sets, while the length limits come from configuration.

use std::collections::BTreeSet;
use std::fmt;

pub mod validator;

#[cfg(test)]
mod tests;

/// Characters that can start, chain or quote a shell command
pub const DENIED_CHARS: [char; 19] = [
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '[', ']', '<', '>', '\\', '"', '\'', '\n', '\r',
    '\t',
];

/// Default whitelist of encoder video codecs
pub const DEFAULT_VIDEO_CODECS: [&str; 5] = ["libx264", "libx265", "libvpx-vp9", "libvpx", "copy"];

/// Default whitelist of encoder audio codecs
pub const DEFAULT_AUDIO_CODECS: [&str; 7] = [
    "aac",
    "libopus",
    "libmp3lame",
    "libvorbis",
    "flac",
    "pcm_s16le",
    "copy",
];

/// Containers accepted as conversion targets
pub const VIDEO_CONTAINER_FORMATS: [&str; 5] = ["mp4", "avi", "mkv", "webm", "mov"];

/// Formats accepted as audio extraction targets
pub const AUDIO_OUTPUT_FORMATS: [&str; 6] = ["mp3", "wav", "aac", "flac", "ogg", "m4a"];

/// Sample rates accepted for audio extraction
pub const ALLOWED_SAMPLE_RATES: [&str; 8] = [
    "8000", "11025", "16000", "22050", "44100", "48000", "88200", "96000",
];

/// Channel counts accepted for audio extraction
pub const ALLOWED_CHANNELS: [&str; 4] = ["1", "2", "6", "8"];

/// Highest FLAC compression level the encoder accepts
pub const MAX_COMPRESSION_LEVEL: u8 = 12;

pub const DEFAULT_MAX_PATH_LENGTH: usize = 255;
pub const DEFAULT_MAX_PARAMETER_LENGTH: usize = 50;

/// Which codec whitelist a value is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Video,
    Audio,
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Video => write!(f, "video"),
            CodecKind::Audio => write!(f, "audio"),
        }
    }
}

/// Validation rules for user inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    allowed_video_codecs: BTreeSet<String>,
    allowed_audio_codecs: BTreeSet<String>,
    allowed_formats: BTreeSet<String>,
    max_path_length: usize,
    max_parameter_length: usize,
}

impl SecurityPolicy {
    /// Create a policy with the default whitelists and the given limits
    pub fn with_limits(max_path_length: usize, max_parameter_length: usize) -> Self {
        Self {
            allowed_video_codecs: to_set(&DEFAULT_VIDEO_CODECS),
            allowed_audio_codecs: to_set(&DEFAULT_AUDIO_CODECS),
            allowed_formats: VIDEO_CONTAINER_FORMATS
                .iter()
                .chain(AUDIO_OUTPUT_FORMATS.iter())
                .map(|s| s.to_string())
                .collect(),
            max_path_length,
            max_parameter_length,
        }
    }

    /// Maximum accepted path length in bytes
    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    /// Maximum accepted parameter length in bytes
    pub fn max_parameter_length(&self) -> usize {
        self.max_parameter_length
    }

    /// Whitelist for the given codec kind
    pub fn allowed_codecs(&self, kind: CodecKind) -> &BTreeSet<String> {
        match kind {
            CodecKind::Video => &self.allowed_video_codecs,
            CodecKind::Audio => &self.allowed_audio_codecs,
        }
    }

    /// Container and audio formats accepted as output
    pub fn allowed_formats(&self) -> &BTreeSet<String> {
        &self.allowed_formats
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_PATH_LENGTH, DEFAULT_MAX_PARAMETER_LENGTH)
    }
}

fn to_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}
