// Extract interactor - Orchestrates audio extraction use case

use std::sync::Arc;

use tracing::info;

use crate::app::EncoderSettings;
use crate::engine::command::{CommandBuilder, EncoderCommand};
use crate::engine::progress::ProgressCallback;
use crate::error::{TranscodeError, TranscodeResult};
use crate::planner::audio::{codec_for_extension, plan_extraction, AudioPlan, ExtractParameters};
use crate::planner::Preset;
use crate::ports::{ExecutePort, ExecutionJob, ExecutionMode, ExecutionReport, ProbePort};
use crate::probe::validator::MediaValidator;
use crate::security::{CodecKind, SecurityPolicy};
use crate::utils::path::lowercase_extension;

/// Request for an audio extraction
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub input_path: String,
    pub output_path: String,
    /// Falls back to the configured default preset
    pub quality: Option<Preset>,
    pub params: ExtractParameters,
    pub overwrite: bool,
    pub mode: ExecutionMode,
}

/// Response from a finished extraction
#[derive(Debug, Clone)]
pub struct ExtractResponse {
    pub plan: AudioPlan,
    pub command: EncoderCommand,
    pub report: ExecutionReport,
}

/// Interactor for audio extraction use case
pub struct ExtractInteractor {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    policy: Arc<SecurityPolicy>,
    settings: EncoderSettings,
}

impl ExtractInteractor {
    /// Create new extract interactor with injected ports
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

    /// Validate paths and every supplied override
    pub fn validate(&self, request: &ExtractRequest) -> TranscodeResult<()> {
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

        let extension = lowercase_extension(&request.output_path).unwrap_or_default();
        if codec_for_extension(&extension).is_none() {
            return Err(TranscodeError::UnsupportedFormat { format: extension });
        }

        let params = &request.params;
        if let Some(codec) = present(&params.codec) {
            policy
                .validate_codec(codec, CodecKind::Audio)
                .map_err(|e| TranscodeError::validation("audio codec", e))?;
        }
        if let Some(bitrate) = present(&params.bitrate) {
            policy
                .validate_bitrate(bitrate)
                .map_err(|e| TranscodeError::validation("audio bitrate", e))?;
        }
        if let Some(rate) = present(&params.sample_rate) {
            policy
                .validate_sample_rate(rate)
                .map_err(|e| TranscodeError::validation("sample rate", e))?;
        }
        if let Some(channels) = present(&params.channels) {
            policy
                .validate_channels(channels)
                .map_err(|e| TranscodeError::validation("channels", e))?;
        }

        Ok(())
    }

    /// Execute the extraction
    pub async fn execute(
        &self,
        request: &ExtractRequest,
        progress: &dyn ProgressCallback,
    ) -> TranscodeResult<ExtractResponse> {
        self.validate(request)?;
        MediaValidator.ensure_writable(&request.output_path, request.overwrite)?;

        let media_info = self.probe_port.analyze_media(&request.input_path).await?;
        MediaValidator.ensure_audio(&media_info)?;

        let quality = request.quality.unwrap_or(self.settings.default_preset);
        let plan = plan_extraction(&request.output_path, quality, &request.params)?;

        let builder = CommandBuilder::new(&self.policy, &self.settings.ffmpeg_path);
        let mut command = builder.build_extract(&request.input_path, &request.output_path, &plan)?;
        if request.mode == ExecutionMode::Tracked {
            command = command.with_stats(self.settings.stats_period);
        }

        info!(
            input = %request.input_path,
            output = %request.output_path,
            codec = %plan.codec,
            "Extracting audio"
        );

        progress.on_command(&command.display());

        let job = ExecutionJob {
            command: command.clone(),
            mode: request.mode,
            total_duration: media_info.duration,
            operation: format!("Extracting audio ({})", plan.codec),
        };
        let report = self.execute_port.execute(&job, progress).await?;

        Ok(ExtractResponse {
            plan,
            command,
            report,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::NoOpProgressCallback;
    use crate::probe::{AudioStream, MediaInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;
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

    #[derive(Default)]
    struct RecordingExecutor {
        jobs: Mutex<Vec<ExecutionJob>>,
    }

    #[async_trait]
    impl ExecutePort for RecordingExecutor {
        async fn execute(
            &self,
            job: &ExecutionJob,
            _progress: &dyn ProgressCallback,
        ) -> TranscodeResult<ExecutionReport> {
            self.jobs.lock().unwrap().push(job.clone());
            Ok(ExecutionReport {
                wall_time: Duration::ZERO,
                progress_updates: 0,
                last_percent: None,
            })
        }

        async fn check_available(&self) -> TranscodeResult<()> {
            Ok(())
        }
    }

    fn media(with_audio: bool) -> MediaInfo {
        MediaInfo {
            filename: "talk.mp4".to_string(),
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: Duration::from_secs(90),
            size: 0,
            bitrate: 0,
            video_streams: Vec::new(),
            audio_streams: if with_audio {
                vec![AudioStream {
                    index: 0,
                    codec: "aac".to_string(),
                    sample_rate: 44100,
                    channels: 2,
                    bitrate: 0,
                    language: "eng".to_string(),
                }]
            } else {
                Vec::new()
            },
        }
    }

    fn interactor(with_audio: bool) -> (ExtractInteractor, Arc<RecordingExecutor>) {
        let executor = Arc::new(RecordingExecutor::default());
        let interactor = ExtractInteractor::new(
            Arc::new(FixedProbe(media(with_audio))),
            executor.clone(),
            Arc::new(SecurityPolicy::default()),
            EncoderSettings {
                ffmpeg_path: "ffmpeg".to_string(),
                stats_period: 0.5,
                default_preset: Preset::Medium,
            },
        );
        (interactor, executor)
    }

    fn request(output: &str) -> ExtractRequest {
        ExtractRequest {
            input_path: "talk.mp4".to_string(),
            output_path: output.to_string(),
            quality: None,
            params: ExtractParameters::default(),
            overwrite: true,
            mode: ExecutionMode::PassThrough,
        }
    }

    #[tokio::test]
    async fn test_mp3_extraction() {
        let (interactor, executor) = interactor(true);
        let response = interactor
            .execute(&request("talk.mp3"), &NoOpProgressCallback)
            .await
            .unwrap();

        assert_eq!(
            response.command.args,
            ["-i", "talk.mp4", "-vn", "-c:a", "libmp3lame", "-b:a", "192k", "-y", "talk.mp3"]
        );
        let jobs = executor.jobs.lock().unwrap();
        assert_eq!(jobs[0].total_duration, Duration::from_secs(90));
        assert_eq!(jobs[0].operation, "Extracting audio (libmp3lame)");
    }

    #[tokio::test]
    async fn test_flac_with_overrides_and_tracking() {
        let (interactor, _) = interactor(true);
        let mut request = request("talk.flac");
        request.quality = Some(Preset::High);
        request.mode = ExecutionMode::Tracked;
        request.params.sample_rate = Some("48000".to_string());
        request.params.channels = Some("1".to_string());

        let response = interactor
            .execute(&request, &NoOpProgressCallback)
            .await
            .unwrap();

        assert_eq!(
            response.command.args,
            [
                "-stats_period", "0.5", "-i", "talk.mp4", "-vn", "-c:a", "flac", "-ar", "48000",
                "-ac", "1", "-compression_level", "8", "-y", "talk.flac"
            ]
        );
    }

    #[tokio::test]
    async fn test_source_without_audio_fails() {
        let (interactor, executor) = interactor(false);
        let result = interactor
            .execute(&request("talk.wav"), &NoOpProgressCallback)
            .await;

        assert!(matches!(result, Err(TranscodeError::NoAudioStreams { .. })));
        assert!(executor.jobs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_overrides_are_rejected() {
        let (interactor, _) = interactor(true);

        let mut bad_rate = request("talk.mp3");
        bad_rate.params.sample_rate = Some("12345".to_string());
        assert!(matches!(
            interactor.execute(&bad_rate, &NoOpProgressCallback).await,
            Err(TranscodeError::Validation { field: "sample rate", .. })
        ));

        let mut video_codec = request("talk.mp3");
        video_codec.params.codec = Some("libx264".to_string());
        assert!(matches!(
            interactor.execute(&video_codec, &NoOpProgressCallback).await,
            Err(TranscodeError::Validation { field: "audio codec", .. })
        ));

        let mut injected = request("talk.mp3");
        injected.params.bitrate = Some("192k;id".to_string());
        assert!(matches!(
            interactor.execute(&injected, &NoOpProgressCallback).await,
            Err(TranscodeError::Validation { field: "audio bitrate", .. })
        ));
    }

    #[tokio::test]
    async fn test_video_output_is_not_an_extraction_target() {
        let (interactor, _) = interactor(true);
        let result = interactor
            .execute(&request("talk.mkv"), &NoOpProgressCallback)
            .await;
        assert!(matches!(result, Err(TranscodeError::UnsupportedFormat { .. })));
    }
}
