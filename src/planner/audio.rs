//! Audio extraction planning

use serde::Serialize;
use tracing::info;

use crate::error::{TranscodeError, TranscodeResult};
use crate::planner::strategy::COPY;
use crate::planner::Preset;
use crate::utils::path::lowercase_extension;

/// Optional user overrides for audio extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractParameters {
    pub codec: Option<String>,
    pub bitrate: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<String>,
}

/// Resolved audio extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioPlan {
    pub codec: String,
    /// Omitted for lossless codecs and stream copy
    pub bitrate: Option<String>,
    pub sample_rate: Option<String>,
    pub channels: Option<String>,
    /// FLAC only
    pub compression_level: Option<String>,
}

/// Encoder for an audio output extension
pub fn codec_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "mp3" => Some("libmp3lame"),
        "aac" | "m4a" => Some("aac"),
        "wav" => Some("pcm_s16le"),
        "flac" => Some("flac"),
        "ogg" => Some("libvorbis"),
        _ => None,
    }
}

/// Whether the codec takes no bitrate
pub fn is_lossless(codec: &str) -> bool {
    matches!(codec, "flac" | "pcm_s16le" | COPY)
}

/// Plan an extraction into `output` at the given quality tier
pub fn plan_extraction(
    output: &str,
    quality: Preset,
    params: &ExtractParameters,
) -> TranscodeResult<AudioPlan> {
    let extension = lowercase_extension(output).unwrap_or_default();
    let default_codec =
        codec_for_extension(&extension).ok_or_else(|| TranscodeError::UnsupportedFormat {
            format: extension.clone(),
        })?;

    let codec = params
        .codec
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(default_codec);

    let bitrate = if is_lossless(codec) {
        None
    } else {
        Some(
            params
                .bitrate
                .as_deref()
                .filter(|b| !b.is_empty())
                .unwrap_or(quality.extraction_bitrate())
                .to_string(),
        )
    };

    let compression_level =
        (codec == "flac").then(|| quality.flac_compression_level().to_string());

    info!(codec, quality = %quality, format = %extension, "Planned audio extraction");

    Ok(AudioPlan {
        codec: codec.to_string(),
        bitrate,
        sample_rate: params.sample_rate.clone().filter(|s| !s.is_empty()),
        channels: params.channels.clone().filter(|c| !c.is_empty()),
        compression_level,
    })
}
