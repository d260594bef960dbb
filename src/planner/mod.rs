//! Codec planning: containers, quality presets and custom parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::path::lowercase_extension;

pub mod audio;
pub mod strategy;

/// Optional user overrides for a conversion.
///
/// Every field is validated on its own; an empty string means the same as
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomParameters {
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub video_bitrate: Option<String>,
    pub audio_bitrate: Option<String>,
    pub resolution: Option<String>,
    pub framerate: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CustomParameters {
    pub fn video_codec(&self) -> Option<&str> {
        non_empty(&self.video_codec)
    }

    pub fn audio_codec(&self) -> Option<&str> {
        non_empty(&self.audio_codec)
    }

    pub fn video_bitrate(&self) -> Option<&str> {
        non_empty(&self.video_bitrate)
    }

    pub fn audio_bitrate(&self) -> Option<&str> {
        non_empty(&self.audio_bitrate)
    }

    pub fn resolution(&self) -> Option<&str> {
        non_empty(&self.resolution)
    }

    pub fn framerate(&self) -> Option<&str> {
        non_empty(&self.framerate)
    }

    /// Whether the caller supplied any override at all
    pub fn is_set(&self) -> bool {
        self.video_codec().is_some()
            || self.audio_codec().is_some()
            || self.video_bitrate().is_some()
            || self.audio_bitrate().is_some()
            || self.resolution().is_some()
            || self.framerate().is_some()
    }
}

/// Quality tier
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Low,
    #[default]
    Medium,
    High,
}

impl Preset {
    /// Video bitrate applied to a default video codec
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            Preset::Low => "1M",
            Preset::Medium => "2M",
            Preset::High => "4M",
        }
    }

    /// Audio bitrate applied to a default audio codec during conversion
    pub fn audio_bitrate(&self) -> &'static str {
        match self {
            Preset::Low => "128k",
            Preset::Medium => "192k",
            Preset::High => "256k",
        }
    }

    /// Audio bitrate for lossy audio extraction
    pub fn extraction_bitrate(&self) -> &'static str {
        match self {
            Preset::Low => "128k",
            Preset::Medium => "192k",
            Preset::High => "320k",
        }
    }

    /// FLAC compression level for audio extraction
    pub fn flac_compression_level(&self) -> &'static str {
        match self {
            Preset::Low => "0",
            Preset::Medium => "5",
            Preset::High => "8",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Low => write!(f, "low"),
            Preset::Medium => write!(f, "medium"),
            Preset::High => write!(f, "high"),
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Preset::Low),
            "medium" => Ok(Preset::Medium),
            "high" => Ok(Preset::High),
            other => Err(format!(
                "invalid preset: {} (valid: low, medium, high)",
                other
            )),
        }
    }
}

/// Target container of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Mov,
    Mkv,
    Webm,
    Avi,
}

impl Container {
    pub const ALL: [Container; 5] = [
        Container::Mp4,
        Container::Mov,
        Container::Mkv,
        Container::Webm,
        Container::Avi,
    ];

    /// Derive the container from an output path's extension
    pub fn from_path(path: &str) -> Option<Self> {
        match lowercase_extension(path)?.as_str() {
            "mp4" => Some(Container::Mp4),
            "mov" => Some(Container::Mov),
            "mkv" => Some(Container::Mkv),
            "webm" => Some(Container::Webm),
            "avi" => Some(Container::Avi),
            _ => None,
        }
    }

    /// Default `(video, audio)` encoders for the container
    pub fn default_codecs(&self) -> (&'static str, &'static str) {
        match self {
            Container::Mp4 | Container::Mov | Container::Mkv => ("libx264", "aac"),
            Container::Webm => ("libvpx-vp9", "libopus"),
            Container::Avi => ("libx264", "libmp3lame"),
        }
    }

    /// Source video codecs that can be remuxed into this container.
    /// `None` means any codec is accepted.
    fn copyable_video(&self) -> Option<&'static [&'static str]> {
        match self {
            Container::Mp4 | Container::Mov => Some(&["h264", "hevc"][..]),
            Container::Webm => Some(&["vp8", "vp9", "av1"][..]),
            Container::Mkv => None,
            Container::Avi => Some(&["h264", "xvid", "divx"][..]),
        }
    }

    fn copyable_audio(&self) -> Option<&'static [&'static str]> {
        match self {
            Container::Mp4 | Container::Mov => Some(&["aac", "mp3"][..]),
            Container::Webm => Some(&["vorbis", "opus"][..]),
            Container::Mkv => None,
            Container::Avi => Some(&["mp3", "ac3"][..]),
        }
    }

    /// Whether a probed video codec can be stream-copied into this container
    pub fn accepts_video(&self, codec: &str) -> bool {
        accepts(self.copyable_video(), codec)
    }

    /// Whether a probed audio codec can be stream-copied into this container
    pub fn accepts_audio(&self, codec: &str) -> bool {
        accepts(self.copyable_audio(), codec)
    }
}

// Probe names vary (`mp3float`, `h264_cuvid`), so family names match by substring.
fn accepts(families: Option<&[&str]>, codec: &str) -> bool {
    let codec = codec.to_lowercase();
    match families {
        None => true,
        Some(families) => families.iter().any(|family| codec.contains(family)),
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
            Container::Mkv => "mkv",
            Container::Webm => "webm",
            Container::Avi => "avi",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of codec selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecDecision {
    /// Effective video encoder, `copy` when remuxing
    pub video_codec: String,
    /// Effective audio encoder, `copy` when remuxing
    pub audio_codec: String,
    /// Whether both streams are remuxed without re-encoding
    pub stream_copy: bool,
    /// Effective video bitrate, user supplied or from the preset
    pub video_bitrate: Option<String>,
    /// Effective audio bitrate, user supplied or from the preset
    pub audio_bitrate: Option<String>,
}
