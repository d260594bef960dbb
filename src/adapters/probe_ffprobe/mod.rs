//! FFprobe adapter for media file probing
//!
//! Runs the prober once per request with an explicit argument vector and maps
//! its JSON report onto the media model. There are no retries.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::monitor::check_tool_version;
use crate::error::{TranscodeError, TranscodeResult};
use crate::ports::ProbePort;
use crate::probe::report::parse_report;
use crate::probe::validator::MediaValidator;
use crate::probe::MediaInfo;
use crate::utils::path::as_encoder_operand;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    program: String,
}

impl FfprobeAdapter {
    /// Create a new adapter for the prober at `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn analyze_media(&self, file_path: &str) -> TranscodeResult<MediaInfo> {
        MediaValidator.ensure_exists(file_path)?;
        info!(input = %file_path, "Probing media file");

        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(as_encoder_operand(file_path))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::ToolUnavailable {
                        tool: self.program.clone(),
                        message: e.to_string(),
                    }
                } else {
                    TranscodeError::ProbeFailed {
                        message: format!("failed to run {}: {}", self.program, e),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::ProbeFailed {
                message: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        let report = String::from_utf8_lossy(&output.stdout);
        let media_info = parse_report(&report, file_path)?;

        debug!(
            format = %media_info.format,
            video_streams = media_info.video_streams.len(),
            audio_streams = media_info.audio_streams.len(),
            "Probe completed"
        );
        Ok(media_info)
    }

    async fn check_available(&self) -> TranscodeResult<()> {
        check_tool_version(&self.program).await
    }
}
