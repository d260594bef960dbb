//! Whitelist and grammar validators
//!
//! All validators are pure: no I/O, and the same input always yields the
//! same verdict.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::{TranscodeError, TranscodeResult, ValidationError};
use crate::planner::CustomParameters;
use crate::security::{
    CodecKind, SecurityPolicy, ALLOWED_CHANNELS, ALLOWED_SAMPLE_RATES, DENIED_CHARS,
    MAX_COMPRESSION_LEVEL,
};
use crate::utils::path::{lowercase_extension, normalize_lexically};

static BITRATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?[kKmM]?$").expect("bitrate pattern compiles"));

static RESOLUTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)x([0-9]+)$").expect("resolution pattern compiles"));

static FRAMERATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("framerate pattern compiles"));

const MAX_WIDTH: u32 = 7680;
const MAX_HEIGHT: u32 = 4320;
const MAX_FRAMERATE: f64 = 120.0;

impl SecurityPolicy {
    /// Validate a codec name against the whitelist for `kind`
    pub fn validate_codec(&self, value: &str, kind: CodecKind) -> Result<(), ValidationError> {
        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !self.allowed_codecs(kind).contains(value) {
            return Err(ValidationError::NotAllowed {
                kind: kind.to_string(),
                value: value.to_string(),
            });
        }

        Ok(())
    }

    /// Validate a bitrate such as `2M`, `1500k` or `192k`; empty means unspecified
    pub fn validate_bitrate(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !BITRATE_PATTERN.is_match(value) {
            return Err(ValidationError::InvalidFormat {
                what: "bitrate",
                value: value.to_string(),
                hint: "use format like 2M, 1500k, 192k",
            });
        }

        Ok(())
    }

    /// Validate a `WIDTHxHEIGHT` resolution; empty means unspecified
    pub fn validate_resolution(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        let captures = RESOLUTION_PATTERN
            .captures(value)
            .ok_or_else(|| ValidationError::InvalidFormat {
                what: "resolution",
                value: value.to_string(),
                hint: "use format like 1920x1080",
            })?;

        let out_of_range = || ValidationError::OutOfRange {
            what: "resolution",
            value: value.to_string(),
            range: "1x1 to 7680x4320",
        };

        // Overlong digit runs fail to parse and are out of range by definition
        let width: u32 = captures[1].parse().map_err(|_| out_of_range())?;
        let height: u32 = captures[2].parse().map_err(|_| out_of_range())?;

        if !(1..=MAX_WIDTH).contains(&width) || !(1..=MAX_HEIGHT).contains(&height) {
            return Err(out_of_range());
        }

        Ok(())
    }

    /// Validate a frame rate in (0, 120]; empty means unspecified
    pub fn validate_framerate(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !FRAMERATE_PATTERN.is_match(value) {
            return Err(ValidationError::InvalidFormat {
                what: "framerate",
                value: value.to_string(),
                hint: "use format like 30, 24, 23.976",
            });
        }

        let fps: f64 = value.parse().map_err(|_| ValidationError::InvalidFormat {
            what: "framerate",
            value: value.to_string(),
            hint: "use format like 30, 24, 23.976",
        })?;

        if fps <= 0.0 || fps > MAX_FRAMERATE {
            return Err(ValidationError::OutOfRange {
                what: "framerate",
                value: value.to_string(),
                range: "must be greater than 0 and at most 120",
            });
        }

        Ok(())
    }

    /// Validate a file path against traversal and injection characters
    pub fn validate_file_path(&self, path: &str) -> Result<(), ValidationError> {
        self.check_length(path, self.max_path_length())?;

        if path.is_empty() {
            return Err(ValidationError::Empty);
        }

        let normalized = normalize_lexically(path);
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(ValidationError::Traversal {
                path: path.to_string(),
            });
        }

        if let Some(ch) = path
            .chars()
            .find(|c| DENIED_CHARS.contains(c) || c.is_control())
        {
            return Err(ValidationError::InvalidCharacter { ch });
        }

        Ok(())
    }

    /// Validate that the path's extension is a supported output format
    pub fn validate_file_format(&self, path: &str) -> Result<(), ValidationError> {
        let extension = lowercase_extension(path).unwrap_or_default();

        if !self.allowed_formats().contains(&extension) {
            return Err(ValidationError::FormatNotAllowed { extension });
        }

        Ok(())
    }

    /// Validate an audio sample rate; empty means unspecified
    pub fn validate_sample_rate(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !ALLOWED_SAMPLE_RATES.contains(&value) {
            return Err(ValidationError::OutOfRange {
                what: "sample rate",
                value: value.to_string(),
                range: "valid: 8000, 11025, 16000, 22050, 44100, 48000, 88200, 96000",
            });
        }

        Ok(())
    }

    /// Validate an audio channel count; empty means unspecified
    pub fn validate_channels(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !ALLOWED_CHANNELS.contains(&value) {
            return Err(ValidationError::OutOfRange {
                what: "channel count",
                value: value.to_string(),
                range: "valid: 1=mono, 2=stereo, 6=5.1, 8=7.1",
            });
        }

        Ok(())
    }

    /// Validate a FLAC compression level, `0` to `12`
    pub fn validate_compression_level(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }

        self.check_length(value, self.max_parameter_length())?;
        check_denied_chars(value)?;

        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                what: "compression level",
                value: value.to_string(),
                hint: "expected an integer",
            });
        }

        match value.parse::<u8>() {
            Ok(level) if level <= MAX_COMPRESSION_LEVEL => Ok(()),
            _ => Err(ValidationError::OutOfRange {
                what: "compression level",
                value: value.to_string(),
                range: "valid: 0-12",
            }),
        }
    }

    /// Validate every custom parameter independently, naming the failing field
    pub fn validate_custom_parameters(&self, params: &CustomParameters) -> TranscodeResult<()> {
        if let Some(codec) = params.video_codec() {
            self.validate_codec(codec, CodecKind::Video)
                .map_err(|e| TranscodeError::validation("video codec", e))?;
        }
        if let Some(codec) = params.audio_codec() {
            self.validate_codec(codec, CodecKind::Audio)
                .map_err(|e| TranscodeError::validation("audio codec", e))?;
        }

        self.validate_bitrate(params.video_bitrate().unwrap_or_default())
            .map_err(|e| TranscodeError::validation("video bitrate", e))?;
        self.validate_bitrate(params.audio_bitrate().unwrap_or_default())
            .map_err(|e| TranscodeError::validation("audio bitrate", e))?;
        self.validate_resolution(params.resolution().unwrap_or_default())
            .map_err(|e| TranscodeError::validation("resolution", e))?;
        self.validate_framerate(params.framerate().unwrap_or_default())
            .map_err(|e| TranscodeError::validation("framerate", e))?;

        Ok(())
    }

    fn check_length(&self, value: &str, max: usize) -> Result<(), ValidationError> {
        if value.len() > max {
            return Err(ValidationError::TooLong {
                len: value.len(),
                max,
            });
        }
        Ok(())
    }
}

/// Reject any value containing a shell metacharacter or line/tab control
pub fn check_denied_chars(value: &str) -> Result<(), ValidationError> {
    match value.chars().find(|c| DENIED_CHARS.contains(c)) {
        Some(ch) => Err(ValidationError::InvalidCharacter { ch }),
        None => Ok(()),
    }
}
