//! Progress parsing and callback system
//!
//! The encoder redraws a statistics line such as
//! `frame=  120 fps= 60 q=28.0 size=  512kB time=00:00:05.00 bitrate= 838.9kbits/s speed=2.0x`
//! on its diagnostic stream. Lines are turned into [`ProgressUpdate`] values
//! and handed to a [`ProgressCallback`].

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Serialize;

use crate::utils::time::{clock_to_duration, format_eta};

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=(\d+):(\d{2}):(\d{2})\.(\d{2})").expect("time pattern compiles")
});

static SPEED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"speed=\s*([0-9.]+)x").expect("speed pattern compiles"));

const BAR_WIDTH: usize = 30;
const CLEAR_WIDTH: usize = 100;

/// One parsed statistics line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    /// Encoded media time so far
    #[serde(serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
    /// Percentage of the total duration, clamped to [0, 100]
    pub percent: f64,
    /// Encoding speed as a multiple of real time
    pub speed: Option<f64>,
    /// Estimated wall-clock time remaining
    #[serde(serialize_with = "serialize_optional_seconds")]
    pub eta: Option<Duration>,
}

/// Parse a diagnostic line against the known media duration.
///
/// Returns `None` when the line carries no elapsed-time token.
pub fn parse_progress_line(line: &str, total: Duration) -> Option<ProgressUpdate> {
    let caps = TIME_PATTERN.captures(line)?;
    let component = |i: usize| caps[i].parse::<u64>().ok();
    let elapsed =
        clock_to_duration(component(1)?, component(2)?, component(3)?, component(4)?)?;

    let percent = if total.is_zero() {
        0.0
    } else {
        (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
    };

    let speed = SPEED_PATTERN
        .captures(line)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|speed| speed.is_finite());

    let eta = match speed {
        Some(speed) if speed > 0.0 && elapsed < total => {
            Duration::try_from_secs_f64((total - elapsed).as_secs_f64() / speed).ok()
        }
        _ => None,
    };

    Some(ProgressUpdate {
        elapsed,
        percent,
        speed,
        eta,
    })
}

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called with the final command line, before anything is spawned
    fn on_command(&self, _command: &str) {}

    /// Called before the encoder starts
    fn on_start(&self, operation: &str, total: Duration);

    /// Called for each parsed statistics line
    fn on_progress(&self, update: &ProgressUpdate);

    /// Called once the encoder has exited, before any final message
    fn on_finish(&self);

    /// Called when the operation completes successfully
    fn on_complete(&self, message: &str);

    /// Called when the operation fails
    fn on_error(&self, error: &str);

    /// Called when the operation is cancelled
    fn on_cancel(&self);
}

/// Console progress bar redrawn in place with carriage returns
pub struct ConsoleProgressCallback {
    out: Mutex<Box<dyn Write + Send>>,
    drawn: Mutex<bool>,
    echo_command: bool,
}

impl ConsoleProgressCallback {
    /// Render to standard output
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Render to an arbitrary writer
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            drawn: Mutex::new(false),
            echo_command: false,
        }
    }

    /// Print the encoder command line before it runs
    pub fn with_command_echo(mut self, echo: bool) -> Self {
        self.echo_command = echo;
        self
    }

    /// Build the progress line for an update, without the leading `\r`
    pub fn render(update: &ProgressUpdate) -> String {
        let filled = ((update.percent / 100.0) * BAR_WIDTH as f64) as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar = "█".repeat(filled) + &"░".repeat(BAR_WIDTH - filled);

        let mut line = format!("📊 [{}] {:.1}%", bar, update.percent);
        if let Some(speed) = update.speed {
            line.push_str(&format!(" - {:.1}x speed", speed));
        }
        if let Some(eta) = update.eta {
            line.push_str(&format!(" (ETA: {})", format_eta(eta)));
        }
        line
    }

    fn write(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            // Terminal write failures are not worth aborting an encode over
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_command(&self, command: &str) {
        if self.echo_command {
            self.write(&format!("Command: {}\n", command));
        }
    }

    fn on_start(&self, operation: &str, _total: Duration) {
        self.write(&format!("🚀 {}\n", operation));
    }

    fn on_progress(&self, update: &ProgressUpdate) {
        self.write(&format!("\r{}", Self::render(update)));
        if let Ok(mut drawn) = self.drawn.lock() {
            *drawn = true;
        }
    }

    fn on_finish(&self) {
        let was_drawn = self
            .drawn
            .lock()
            .map(|mut drawn| std::mem::replace(&mut *drawn, false))
            .unwrap_or(false);
        if was_drawn {
            self.write(&format!("\r{}\r", " ".repeat(CLEAR_WIDTH)));
        }
    }

    fn on_complete(&self, message: &str) {
        self.write(&format!("✅ {}\n", message));
    }

    fn on_error(&self, error: &str) {
        self.write(&format!("❌ {}\n", error));
    }

    fn on_cancel(&self) {
        self.write("⚠️  Operation cancelled\n");
    }
}

/// JSON progress callback for structured output, one event per line
pub struct JsonProgressCallback {
    out: Mutex<Box<dyn Write + Send>>,
    echo_command: bool,
}

impl JsonProgressCallback {
    /// Emit events on standard output
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Emit events to an arbitrary writer
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            echo_command: false,
        }
    }

    /// Emit a `command` event before the encoder runs
    pub fn with_command_echo(mut self, echo: bool) -> Self {
        self.echo_command = echo;
        self
    }

    fn emit(&self, mut event: serde_json::Value) {
        event["timestamp"] = serde_json::Value::String(chrono::Utc::now().to_rfc3339());
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{}", event);
            let _ = out.flush();
        }
    }
}

impl Default for JsonProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for JsonProgressCallback {
    fn on_command(&self, command: &str) {
        if self.echo_command {
            self.emit(serde_json::json!({ "event": "command", "command": command }));
        }
    }

    fn on_start(&self, operation: &str, total: Duration) {
        self.emit(serde_json::json!({
            "event": "start",
            "operation": operation,
            "total_seconds": total.as_secs_f64(),
        }));
    }

    fn on_progress(&self, update: &ProgressUpdate) {
        self.emit(serde_json::json!({
            "event": "progress",
            "elapsed_seconds": update.elapsed.as_secs_f64(),
            "percent": update.percent,
            "speed": update.speed,
            "eta_seconds": update.eta.map(|eta| eta.as_secs_f64()),
        }));
    }

    fn on_finish(&self) {}

    fn on_complete(&self, message: &str) {
        self.emit(serde_json::json!({ "event": "complete", "message": message }));
    }

    fn on_error(&self, error: &str) {
        self.emit(serde_json::json!({ "event": "error", "error": error }));
    }

    fn on_cancel(&self) {
        self.emit(serde_json::json!({ "event": "cancel" }));
    }
}

/// No-op progress callback for when progress output is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _operation: &str, _total: Duration) {}
    fn on_progress(&self, _update: &ProgressUpdate) {}
    fn on_finish(&self) {}
    fn on_complete(&self, _message: &str) {}
    fn on_error(&self, _error: &str) {}
    fn on_cancel(&self) {}
}

fn serialize_seconds<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

fn serialize_optional_seconds<S: serde::Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}
