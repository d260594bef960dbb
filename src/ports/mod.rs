// Ports - Interface definitions (contracts)

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::engine::command::EncoderCommand;
use crate::engine::progress::ProgressCallback;
use crate::error::TranscodeResult;
use crate::probe::MediaInfo;

/// Port for media file probing and analysis
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a media file and return its complete description
    async fn analyze_media(&self, file_path: &str) -> TranscodeResult<MediaInfo>;

    /// Check that the prober can be invoked
    async fn check_available(&self) -> TranscodeResult<()>;
}

/// How the encoder's diagnostic stream is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Diagnostics go straight to the terminal, unparsed
    PassThrough,
    /// Diagnostics are captured and scanned for progress
    Tracked,
}

/// A single encoder run
#[derive(Debug, Clone)]
pub struct ExecutionJob {
    pub command: EncoderCommand,
    pub mode: ExecutionMode,
    /// Media duration used to turn elapsed time into a percentage
    pub total_duration: Duration,
    /// Short description for progress output
    pub operation: String,
}

/// Summary of a finished encoder run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    /// Wall-clock time the encoder ran for
    pub wall_time: Duration,
    /// Number of progress updates observed
    pub progress_updates: usize,
    /// Last observed percentage, if any
    pub last_percent: Option<f64>,
}

/// Port for encoder execution
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Run the job to completion, reporting progress to `progress`
    async fn execute(
        &self,
        job: &ExecutionJob,
        progress: &dyn ProgressCallback,
    ) -> TranscodeResult<ExecutionReport>;

    /// Check that the encoder can be invoked
    async fn check_available(&self) -> TranscodeResult<()>;
}
