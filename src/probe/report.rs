//! Mapping of the prober's JSON report onto [`MediaInfo`]
//!
//! The report is produced by
//! `ffprobe -v quiet -print_format json -show_format -show_streams <file>`.
//! Numeric values arrive as strings and may be `N/A`; those map to 0.

use serde::Deserialize;
use tracing::debug;

use crate::error::{TranscodeError, TranscodeResult};
use crate::probe::{AudioStream, MediaInfo, VideoStream};
use crate::utils::time::parse_fractional_seconds;

/// Language tag the prober uses for "undefined"
const UNDEFINED_LANGUAGE: &str = "und";

#[derive(Debug, Deserialize)]
struct ProbeReport {
    format: ReportFormat,
    #[serde(default)]
    streams: Vec<ReportStream>,
}

#[derive(Debug, Deserialize)]
struct ReportFormat {
    #[serde(default)]
    format_name: String,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReportStream {
    index: u32,
    #[serde(default)]
    codec_type: String,
    #[serde(default)]
    codec_name: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    pix_fmt: Option<String>,
    bit_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: ReportTags,
}

#[derive(Debug, Default, Deserialize)]
struct ReportTags {
    language: Option<String>,
}

/// Parse a prober JSON report for `path`.
///
/// Any schema violation fails the whole parse; no partial [`MediaInfo`] is
/// ever returned.
pub fn parse_report(json: &str, path: &str) -> TranscodeResult<MediaInfo> {
    let report: ProbeReport =
        serde_json::from_str(json).map_err(|e| TranscodeError::ProbeFailed {
            message: format!("failed to parse ffprobe output: {}", e),
        })?;

    let mut info = MediaInfo {
        filename: path.to_string(),
        format: report.format.format_name,
        duration: report
            .format
            .duration
            .as_deref()
            .and_then(parse_fractional_seconds)
            .unwrap_or_default(),
        size: parse_number(report.format.size.as_deref()),
        bitrate: parse_number(report.format.bit_rate.as_deref()),
        video_streams: Vec::new(),
        audio_streams: Vec::new(),
    };

    for stream in report.streams {
        match stream.codec_type.as_str() {
            "video" => info.video_streams.push(VideoStream {
                index: stream.index,
                codec: stream.codec_name,
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
                frame_rate: stream.r_frame_rate.unwrap_or_default(),
                pixel_format: stream.pix_fmt.unwrap_or_default(),
                bitrate: parse_number(stream.bit_rate.as_deref()),
            }),
            "audio" => info.audio_streams.push(AudioStream {
                index: stream.index,
                codec: stream.codec_name,
                sample_rate: parse_number(stream.sample_rate.as_deref()),
                channels: stream.channels.unwrap_or(0),
                bitrate: parse_number(stream.bit_rate.as_deref()),
                language: stream
                    .tags
                    .language
                    .filter(|lang| lang != UNDEFINED_LANGUAGE)
                    .unwrap_or_default(),
            }),
            other => debug!(index = stream.index, kind = other, "Skipping stream"),
        }
    }

    Ok(info)
}

fn parse_number<T: std::str::FromStr + Default>(value: Option<&str>) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}
