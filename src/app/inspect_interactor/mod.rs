// Inspect interactor - Orchestrates media file inspection use case

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::info;

use crate::error::{TranscodeError, TranscodeResult};
use crate::ports::ProbePort;
use crate::probe::validator::MediaValidator;
use crate::probe::MediaInfo;
use crate::security::SecurityPolicy;
use crate::utils::path::file_name;
use crate::utils::time::format_clock;
use crate::utils::{format_bitrate, format_bytes};

/// Report rendering format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InspectFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Request for media file inspection
#[derive(Debug, Clone)]
pub struct InspectRequest {
    pub input_path: String,
    pub format: InspectFormat,
    pub detailed: bool,
    /// Write the report here instead of returning it for display
    pub output_path: Option<String>,
    /// Replace an existing report file
    pub overwrite: bool,
}

impl InspectRequest {
    /// Create a text inspection request
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            format: InspectFormat::Text,
            detailed: false,
            output_path: None,
            overwrite: false,
        }
    }
}

/// Response from media file inspection
#[derive(Debug, Clone)]
pub struct InspectResponse {
    pub media_info: MediaInfo,
    pub report: String,
    /// Set when the report was written to a file
    pub written_to: Option<String>,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    policy: Arc<SecurityPolicy>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>, policy: Arc<SecurityPolicy>) -> Self {
        Self { probe_port, policy }
    }

    /// Execute media file inspection
    pub async fn execute(&self, request: &InspectRequest) -> TranscodeResult<InspectResponse> {
        self.policy
            .validate_file_path(&request.input_path)
            .map_err(|e| TranscodeError::validation("input path", e))?;
        if let Some(output) = &request.output_path {
            self.policy
                .validate_file_path(output)
                .map_err(|e| TranscodeError::validation("output path", e))?;
            MediaValidator.ensure_writable(output, request.overwrite)?;
        }

        info!(input = %request.input_path, "Starting media file inspection");
        let media_info = self.probe_port.analyze_media(&request.input_path).await?;

        let report = match request.format {
            InspectFormat::Json => self.format_as_json(&media_info)?,
            InspectFormat::Yaml => self.format_as_yaml(&media_info)?,
            InspectFormat::Text => self.format_as_text(&media_info, request.detailed),
        };

        let written_to = match &request.output_path {
            Some(output) => {
                tokio::fs::write(output, &report).await?;
                info!(output = %output, "Media information saved");
                Some(output.clone())
            }
            None => None,
        };

        Ok(InspectResponse {
            media_info,
            report,
            written_to,
        })
    }

    /// Format media info as JSON
    fn format_as_json(&self, media_info: &MediaInfo) -> TranscodeResult<String> {
        serde_json::to_string_pretty(media_info).map_err(|e| TranscodeError::Config {
            message: format!("JSON serialization failed: {}", e),
        })
    }

    /// Format media info as YAML
    fn format_as_yaml(&self, media_info: &MediaInfo) -> TranscodeResult<String> {
        serde_yaml::to_string(media_info).map_err(|e| TranscodeError::Config {
            message: format!("YAML serialization failed: {}", e),
        })
    }

    /// Format media info as human-readable text
    fn format_as_text(&self, info: &MediaInfo, detailed: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = render_text(&mut out, info, detailed);
        out
    }
}

fn render_text(out: &mut String, info: &MediaInfo, detailed: bool) -> std::fmt::Result {
    let title = if detailed {
        "Detailed Media Information"
    } else {
        "Media Information"
    };
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;
    writeln!(out)?;

    writeln!(out, "File Information:")?;
    writeln!(out, "   Name: {}", file_name(&info.filename))?;
    writeln!(out, "   Path: {}", info.filename)?;
    writeln!(out, "   Format: {}", info.format.to_uppercase())?;
    writeln!(out, "   Duration: {}", format_clock(info.duration))?;
    writeln!(out, "   Size: {}", format_bytes(info.size))?;
    if info.bitrate > 0 {
        writeln!(out, "   Overall Bitrate: {}", format_bitrate(info.bitrate))?;
    }
    if detailed {
        writeln!(out, "   Duration (seconds): {:.3}", info.duration.as_secs_f64())?;
        writeln!(out, "   Size (bytes): {}", info.size)?;
        if info.bitrate > 0 {
            writeln!(out, "   Bitrate (bps): {}", info.bitrate)?;
        }
    }

    if !info.video_streams.is_empty() {
        writeln!(out)?;
        writeln!(out, "Video Streams:")?;
        for (i, stream) in info.video_streams.iter().enumerate() {
            writeln!(out, "   Stream {}:", i + 1)?;
            if detailed {
                writeln!(out, "     Stream Index: {}", stream.index)?;
            }
            writeln!(out, "     Codec: {}", stream.codec)?;
            writeln!(out, "     Resolution: {}x{}", stream.width, stream.height)?;
            match stream.fps() {
                Some(fps) => writeln!(out, "     Frame Rate: {:.2} fps ({})", fps, stream.frame_rate)?,
                None => writeln!(out, "     Frame Rate: {}", stream.frame_rate)?,
            }
            writeln!(out, "     Pixel Format: {}", stream.pixel_format)?;
            if stream.bitrate > 0 {
                writeln!(out, "     Bitrate: {}", format_bitrate(stream.bitrate))?;
            }
            if detailed && stream.height > 0 {
                writeln!(
                    out,
                    "     Aspect Ratio: {:.2}:1",
                    f64::from(stream.width) / f64::from(stream.height)
                )?;
                writeln!(
                    out,
                    "     Total Pixels: {}",
                    u64::from(stream.width) * u64::from(stream.height)
                )?;
            }
        }
    }

    if !info.audio_streams.is_empty() {
        writeln!(out)?;
        writeln!(out, "Audio Streams:")?;
        for (i, stream) in info.audio_streams.iter().enumerate() {
            writeln!(out, "   Stream {}:", i + 1)?;
            if detailed {
                writeln!(out, "     Stream Index: {}", stream.index)?;
            }
            writeln!(out, "     Codec: {}", stream.codec)?;
            writeln!(out, "     Sample Rate: {} Hz", stream.sample_rate)?;
            writeln!(out, "     Channels: {} ({})", stream.channels, stream.channel_layout())?;
            if stream.bitrate > 0 {
                writeln!(out, "     Bitrate: {}", format_bitrate(stream.bitrate))?;
            }
            if !stream.language.is_empty() {
                writeln!(out, "     Language: {}", stream.language)?;
            } else if detailed {
                writeln!(out, "     Language: undefined")?;
            }
        }
    }

    if detailed {
        writeln!(out)?;
        writeln!(out, "Technical Summary:")?;
        writeln!(
            out,
            "   Total Streams: {}",
            info.video_streams.len() + info.audio_streams.len()
        )?;
        writeln!(out, "   Video Streams: {}", info.video_streams.len())?;
        writeln!(out, "   Audio Streams: {}", info.audio_streams.len())?;
        if let Some(frames) = info.estimated_frames().filter(|_| !info.duration.is_zero()) {
            writeln!(out, "   Estimated Total Frames: {}", frames)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{AudioStream, VideoStream};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedProbe(MediaInfo);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn analyze_media(&self, _file_path: &str) -> TranscodeResult<MediaInfo> {
            Ok(self.0.clone())
        }

        async fn check_available(&self) -> TranscodeResult<()> {
            Ok(())
        }
    }

    fn media() -> MediaInfo {
        MediaInfo {
            filename: "media/movie.mkv".to_string(),
            format: "matroska,webm".to_string(),
            duration: Duration::from_secs(3723),
            size: 1536,
            bitrate: 4_500_000,
            video_streams: vec![VideoStream {
                index: 0,
                codec: "hevc".to_string(),
                width: 3840,
                height: 2160,
                frame_rate: "24/1".to_string(),
                pixel_format: "yuv420p10le".to_string(),
                bitrate: 0,
            }],
            audio_streams: vec![AudioStream {
                index: 1,
                codec: "eac3".to_string(),
                sample_rate: 48000,
                channels: 6,
                bitrate: 640_000,
                language: String::new(),
            }],
        }
    }

    fn interactor() -> InspectInteractor {
        InspectInteractor::new(
            Arc::new(FixedProbe(media())),
            Arc::new(SecurityPolicy::default()),
        )
    }

    #[tokio::test]
    async fn test_text_report() {
        let response = interactor()
            .execute(&InspectRequest::new("media/movie.mkv"))
            .await
            .unwrap();

        let report = response.report;
        assert!(report.starts_with("Media Information\n"));
        assert!(report.contains("   Name: movie.mkv\n"));
        assert!(report.contains("   Format: MATROSKA,WEBM\n"));
        assert!(report.contains("   Duration: 01:02:03\n"));
        assert!(report.contains("   Size: 1.5 KB\n"));
        assert!(report.contains("   Overall Bitrate: 4.5 Mbps\n"));
        assert!(report.contains("     Frame Rate: 24.00 fps (24/1)\n"));
        assert!(report.contains("     Channels: 6 (5.1 Surround)\n"));
        assert!(!report.contains("Technical Summary"));
    }

    #[tokio::test]
    async fn test_detailed_report() {
        let mut request = InspectRequest::new("media/movie.mkv");
        request.detailed = true;

        let report = interactor().execute(&request).await.unwrap().report;
        assert!(report.contains("Detailed Media Information"));
        assert!(report.contains("     Language: undefined\n"));
        assert!(report.contains("     Aspect Ratio: 1.78:1\n"));
        assert!(report.contains("   Estimated Total Frames: 89352\n"));
    }

    #[tokio::test]
    async fn test_structured_reports() {
        let mut request = InspectRequest::new("media/movie.mkv");
        request.format = InspectFormat::Json;
        let json = interactor().execute(&request).await.unwrap().report;
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["video_streams"][0]["codec"], "hevc");
        assert_eq!(value["duration"], 3723.0);

        request.format = InspectFormat::Yaml;
        let yaml = interactor().execute(&request).await.unwrap().report;
        assert!(yaml.contains("codec: eac3"));
    }

    #[tokio::test]
    async fn test_report_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("info.txt").to_string_lossy().to_string();

        let mut request = InspectRequest::new("media/movie.mkv");
        request.output_path = Some(output.clone());

        let response = interactor().execute(&request).await.unwrap();
        assert_eq!(response.written_to.as_deref(), Some(output.as_str()));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), response.report);
    }

    #[tokio::test]
    async fn test_existing_report_requires_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("info.txt");
        std::fs::write(&output, "keep me").unwrap();

        let mut request = InspectRequest::new("media/movie.mkv");
        request.output_path = Some(output.to_string_lossy().to_string());

        let result = interactor().execute(&request).await;
        assert!(matches!(result, Err(TranscodeError::OutputExists { .. })));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        request.overwrite = true;
        let response = interactor().execute(&request).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), response.report);
    }

    #[tokio::test]
    async fn test_unsafe_path_is_rejected_before_probing() {
        let result = interactor()
            .execute(&InspectRequest::new("../../etc/passwd"))
            .await;
        assert!(matches!(result, Err(TranscodeError::Validation { .. })));
    }
}
