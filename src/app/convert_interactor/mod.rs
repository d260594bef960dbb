// Convert interactor - Orchestrates format conversion use case

use std::sync::Arc;

use tracing::info;

use crate::app::EncoderSettings;
use crate::engine::command::{CommandBuilder, ConvertSpec, EncoderCommand};
use crate::engine::progress::ProgressCallback;
use crate::error::{TranscodeError, TranscodeResult};
use crate::planner::strategy::{CodecSelector, SelectionInput};
use crate::planner::{CodecDecision, Container, CustomParameters, Preset};
use crate::ports::{ExecutePort, ExecutionJob, ExecutionMode, ExecutionReport, ProbePort};
use crate::probe::validator::MediaValidator;
use crate::security::SecurityPolicy;
use crate::utils::path::lowercase_extension;

/// Request for a format conversion
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input_path: String,
    pub output_path: String,
    /// `None` when the caller did not choose a preset
    pub preset: Option<Preset>,
    pub params: CustomParameters,
    pub overwrite: bool,
    pub mode: ExecutionMode,
}

/// Response from a finished conversion
#[derive(Debug, Clone)]
pub struct ConvertResponse {
    pub decision: CodecDecision,
    pub command: EncoderCommand,
    pub report: ExecutionReport,
}

/// Interactor for format conversion use case
pub struct ConvertInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    policy: Arc<SecurityPolicy>,
    settings: EncoderSettings,
}

impl ConvertInteractor {
    /// Create new convert interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        policy: Arc<SecurityPolicy>,
        settings: EncoderSettings,
    ) -> Self {
        Self {
            probe_port,
            execute_port,
            policy,
            settings,
        }
    }

    /// Validate every untrusted input; nothing is spawned before this passes
    pub fn validate(&self, request: &ConvertRequest) -> TranscodeResult<Container> {
        let policy = &self.policy;
        policy
            .validate_file_path(&request.input_path)
            .map_err(|e| TranscodeError::validation("input path", e))?;
        policy
            .validate_file_path(&request.output_path)
            .map_err(|e| TranscodeError::validation("output path", e))?;
        policy
            .validate_file_format(&request.output_path)
            .map_err(|e| TranscodeError::validation("output format", e))?;
        policy.validate_custom_parameters(&request.params)?;

        Container::from_path(&request.output_path).ok_or_else(|| {
            TranscodeError::UnsupportedFormat {
                format: lowercase_extension(&request.output_path).unwrap_or_default(),
            }
        })
    }

    /// Execute the conversion
    pub async fn execute(
        &self,
        request: &ConvertRequest,
        progress: &dyn ProgressCallback,
    ) -> TranscodeResult<ConvertResponse> {
        let container = self.validate(request)?;
        MediaValidator.ensure_writable(&request.output_path, request.overwrite)?;

        let media_info = self.probe_port.analyze_media(&request.input_path).await?;

        let preset = request.preset.unwrap_or(self.settings.default_preset);
        let decision = CodecSelector::new().select(&SelectionInput {
            media_info: &media_info,
            container,
            preset,
            preset_explicit: request.preset.is_some(),
            params: &request.params,
        });
        info!(
            video = %decision.video_codec,
            audio = %decision.audio_codec,
            stream_copy = decision.stream_copy,
            "Codec decision"
        );

        let builder = CommandBuilder::new(&self.policy, &self.settings.ffmpeg_path);
        let mut command = builder.build_convert(&ConvertSpec {
            input: &request.input_path,
            output: &request.output_path,
            decision: &decision,
            params: &request.params,
        })?;
        if request.mode == ExecutionMode::Tracked {
            command = command.with_stats(self.settings.stats_period);
        }

        let operation = if decision.stream_copy {
            format!("Remuxing into {} (stream copy)", container)
        } else {
            format!(
                "Converting to {} ({} / {})",
                container, decision.video_codec, decision.audio_codec
            )
        };

        progress.on_command(&command.display());

        let job = ExecutionJob {
            command: command.clone(),
            mode: request.mode,
            total_duration: media_info.duration,
            operation,
        };
        let report = self.execute_port.execute(&job, progress).await?;

        Ok(ConvertResponse {
            decision,
            command,
            report,
        })
    }
}
