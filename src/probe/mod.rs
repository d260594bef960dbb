//! Media file inspection model and validation

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::utils::channel_layout;

pub mod report;
pub mod validator;

/// Media file information as reported by the prober
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    /// File path as given to the prober
    pub filename: String,
    /// Container format name, e.g. `mov,mp4,m4a,3gp,3g2,mj2`
    pub format: String,
    /// Total duration
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
    /// File size in bytes
    pub size: u64,
    /// Overall bit rate in bits per second, 0 if unknown
    pub bitrate: u64,
    /// Video streams in report order
    pub video_streams: Vec<VideoStream>,
    /// Audio streams in report order
    pub audio_streams: Vec<AudioStream>,
}

/// Video stream information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoStream {
    pub index: u32,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Raw `num/den` frame-rate expression
    pub frame_rate: String,
    pub pixel_format: String,
    /// Bit rate in bits per second, 0 if unknown
    pub bitrate: u64,
}

/// Audio stream information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioStream {
    pub index: u32,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u32,
    /// Bit rate in bits per second, 0 if unknown
    pub bitrate: u64,
    /// Language tag, empty when undefined
    pub language: String,
}

impl MediaInfo {
    /// Whether the file carries at least one audio stream
    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }

    /// First video stream, the one considered for stream copy
    pub fn primary_video(&self) -> Option<&VideoStream> {
        self.video_streams.first()
    }

    /// First audio stream, the one considered for stream copy
    pub fn primary_audio(&self) -> Option<&AudioStream> {
        self.audio_streams.first()
    }

    /// Approximate frame count of the primary video stream
    pub fn estimated_frames(&self) -> Option<u64> {
        let fps = self.primary_video()?.fps()?;
        Some((self.duration.as_secs_f64() * fps).round() as u64)
    }
}

impl VideoStream {
    /// Frame rate as frames per second, derived from the raw ratio
    pub fn fps(&self) -> Option<f64> {
        parse_frame_rate(&self.frame_rate)
    }
}

impl AudioStream {
    /// Human-readable channel layout name
    pub fn channel_layout(&self) -> String {
        channel_layout(self.channels)
    }
}

/// Parse a `num/den` or plain decimal frame-rate expression
pub fn parse_frame_rate(expression: &str) -> Option<f64> {
    let fps = match expression.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => expression.trim().parse().ok()?,
    };

    (fps.is_finite() && fps > 0.0).then_some(fps)
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
