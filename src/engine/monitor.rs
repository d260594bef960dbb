//! Encoder process execution with optional progress tracking

use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::progress::{parse_progress_line, ProgressCallback, ProgressUpdate};
use crate::error::{TranscodeError, TranscodeResult};
use crate::ports::{ExecutePort, ExecutionJob, ExecutionMode, ExecutionReport};

/// Diagnostic lines kept for error reports
const DIAGNOSTIC_TAIL: usize = 20;
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Runs the encoder as a child process and tracks its progress
pub struct ProgressMonitor {
    program: String,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl ProgressMonitor {
    /// Create a monitor for the encoder at `program`
    pub fn new(program: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            program: program.into(),
            timeout: None,
            cancel,
        }
    }

    /// Kill the encoder if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    fn spawn(&self, job: &ExecutionJob, stderr: Stdio) -> TranscodeResult<Child> {
        info!(command = %job.command.display(), "Starting encoder");

        Command::new(&job.command.program)
            .args(&job.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&job.command.program, e))
    }

    async fn run_pass_through(&self, job: &ExecutionJob) -> TranscodeResult<ExecutionReport> {
        let started = Instant::now();
        let mut child = self.spawn(job, Stdio::inherit())?;

        let deadline = self.deadline();
        tokio::pin!(deadline);

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = self.cancel.cancelled() => {
                terminate(&mut child).await;
                return Err(TranscodeError::Cancelled);
            }
            _ = &mut deadline => {
                terminate(&mut child).await;
                return Err(self.timeout_error());
            }
        };

        check_status(&job.command.program, status, Vec::new())?;
        Ok(ExecutionReport {
            wall_time: started.elapsed(),
            progress_updates: 0,
            last_percent: None,
        })
    }

    async fn run_tracked(
        &self,
        job: &ExecutionJob,
        progress: &dyn ProgressCallback,
    ) -> TranscodeResult<ExecutionReport> {
        let started = Instant::now();
        let mut child = self.spawn(job, Stdio::piped())?;

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                terminate(&mut child).await;
                return Err(TranscodeError::ExecutionFailed {
                    message: "encoder diagnostic stream was not captured".to_string(),
                    diagnostics: None,
                });
            }
        };

        let (tx, mut rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let reader = tokio::spawn(scan_diagnostics(stderr, job.total_duration, tx));

        progress.on_start(&job.operation, job.total_duration);

        let deadline = self.deadline();
        tokio::pin!(deadline);

        let mut updates = 0;
        let mut last_percent = None;
        let mut observe = |update: ProgressUpdate| {
            progress.on_progress(&update);
            updates += 1;
            last_percent = Some(update.percent);
        };

        let status = loop {
            tokio::select! {
                Some(update) = rx.recv() => observe(update),
                status = child.wait() => break status,
                _ = self.cancel.cancelled() => {
                    terminate(&mut child).await;
                    reader.abort();
                    progress.on_finish();
                    return Err(TranscodeError::Cancelled);
                }
                _ = &mut deadline => {
                    terminate(&mut child).await;
                    reader.abort();
                    progress.on_finish();
                    return Err(self.timeout_error());
                }
            }
        };

        // The reader ends once the pipe closes. A leftover process holding the
        // pipe must not outlive the deadline or a cancellation.
        loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(update) => observe(update),
                    None => break,
                },
                _ = self.cancel.cancelled() => {
                    reader.abort();
                    progress.on_finish();
                    return Err(TranscodeError::Cancelled);
                }
                _ = &mut deadline => {
                    warn!("Diagnostic stream still open after encoder exit");
                    reader.abort();
                    progress.on_finish();
                    return Err(self.timeout_error());
                }
            }
        }
        let tail = reader.await.unwrap_or_else(|e| {
            warn!("Diagnostic reader failed: {}", e);
            Vec::new()
        });

        progress.on_finish();

        let status = status?;
        check_status(&job.command.program, status, tail)?;

        debug!(updates, "Encoder finished");
        Ok(ExecutionReport {
            wall_time: started.elapsed(),
            progress_updates: updates,
            last_percent,
        })
    }

    async fn deadline(&self) {
        match self.timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    }

    fn timeout_error(&self) -> TranscodeError {
        TranscodeError::Timeout {
            seconds: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ExecutePort for ProgressMonitor {
    async fn execute(
        &self,
        job: &ExecutionJob,
        progress: &dyn ProgressCallback,
    ) -> TranscodeResult<ExecutionReport> {
        match job.mode {
            ExecutionMode::PassThrough => self.run_pass_through(job).await,
            ExecutionMode::Tracked => self.run_tracked(job, progress).await,
        }
    }

    async fn check_available(&self) -> TranscodeResult<()> {
        check_tool_version(&self.program).await
    }
}

/// Run `<program> -version` and fail with `ToolUnavailable` unless it succeeds
pub async fn check_tool_version(program: &str) -> TranscodeResult<()> {
    let status = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| TranscodeError::ToolUnavailable {
            tool: program.to_string(),
            message: e.to_string(),
        })?;

    if !status.success() {
        return Err(TranscodeError::ToolUnavailable {
            tool: program.to_string(),
            message: format!("-version exited with {}", status),
        });
    }

    Ok(())
}

/// Scan the diagnostic stream, forwarding progress and keeping the last
/// non-progress lines. Records are split on both `\r` and `\n`.
async fn scan_diagnostics<R>(
    stream: R,
    total: Duration,
    tx: mpsc::Sender<ProgressUpdate>,
) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL);
    let mut chunk = Vec::new();

    loop {
        chunk.clear();
        match reader.read_until(b'\r', &mut chunk).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Stopped reading diagnostics: {}", e);
                break;
            }
        }

        let text = String::from_utf8_lossy(&chunk);
        for line in text.split(['\r', '\n']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_progress_line(line, total) {
                // A closed receiver only means nobody is listening any more
                Some(update) => {
                    let _ = tx.send(update).await;
                }
                None => {
                    if tail.len() == DIAGNOSTIC_TAIL {
                        tail.pop_front();
                    }
                    tail.push_back(line.to_string());
                }
            }
        }
    }

    tail.into()
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!("Failed to kill encoder: {}", e);
    }
}

fn spawn_error(program: &str, error: std::io::Error) -> TranscodeError {
    if error.kind() == std::io::ErrorKind::NotFound {
        TranscodeError::ToolUnavailable {
            tool: program.to_string(),
            message: error.to_string(),
        }
    } else {
        TranscodeError::ExecutionFailed {
            message: format!("failed to start {}: {}", program, error),
            diagnostics: None,
        }
    }
}

fn check_status(program: &str, status: ExitStatus, tail: Vec<String>) -> TranscodeResult<()> {
    if status.success() {
        return Ok(());
    }

    Err(TranscodeError::ExecutionFailed {
        message: format!("{} exited with {}", program, status),
        diagnostics: (!tail.is_empty()).then(|| tail.join("\n")),
    })
}
