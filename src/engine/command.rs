//! Encoder argument vector synthesis
//!
//! Commands are ordered argument vectors handed straight to the encoder
//! process, never a shell string. Every value is re-validated immediately
//! before it is inserted, whatever the caller checked upstream.

use std::fmt;

use tracing::debug;

use crate::error::{TranscodeError, TranscodeResult, ValidationError};
use crate::planner::audio::AudioPlan;
use crate::planner::strategy::COPY;
use crate::planner::{CodecDecision, CustomParameters};
use crate::security::{CodecKind, SecurityPolicy};
use crate::utils::path::as_encoder_operand;

/// A fully built encoder invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EncoderCommand {
    /// Ask the encoder to emit a statistics line every `period` seconds.
    /// The option must precede the first input.
    pub fn with_stats(mut self, period: f64) -> Self {
        let mut args = vec!["-stats_period".to_string(), format!("{}", period)];
        args.append(&mut self.args);
        self.args = args;
        self
    }

    /// Render for verbose output; never passed to a shell
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|arg| {
                if arg.contains(' ') {
                    format!("'{}'", arg)
                } else {
                    arg.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Conversion inputs for [`CommandBuilder::build_convert`]
#[derive(Debug, Clone, Copy)]
pub struct ConvertSpec<'a> {
    pub input: &'a str,
    pub output: &'a str,
    pub decision: &'a CodecDecision,
    pub params: &'a CustomParameters,
}

/// Builds encoder argument vectors under a security policy
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder<'a> {
    policy: &'a SecurityPolicy,
    program: &'a str,
}

impl<'a> CommandBuilder<'a> {
    /// Create a builder for the encoder binary at `program`
    pub fn new(policy: &'a SecurityPolicy, program: &'a str) -> Self {
        Self { policy, program }
    }

    /// Build a conversion command:
    /// `-i <in> -c:v <v> [-b:v] -c:a <a> [-b:a] [-s] [-r] -y <out>`
    pub fn build_convert(&self, spec: &ConvertSpec<'_>) -> TranscodeResult<EncoderCommand> {
        let mut args = Vec::new();
        self.push_paths_input(&mut args, spec.input, spec.output)?;

        let decision = spec.decision;
        self.push_codec(&mut args, "-c:v", &decision.video_codec, CodecKind::Video)?;
        if decision.video_codec != COPY {
            if let Some(bitrate) = decision.video_bitrate.as_deref().filter(|b| !b.is_empty()) {
                self.recheck("video bitrate", self.policy.validate_bitrate(bitrate))?;
                args.extend(["-b:v".to_string(), bitrate.to_string()]);
            }
        }

        self.push_codec(&mut args, "-c:a", &decision.audio_codec, CodecKind::Audio)?;
        if decision.audio_codec != COPY {
            if let Some(bitrate) = decision.audio_bitrate.as_deref().filter(|b| !b.is_empty()) {
                self.recheck("audio bitrate", self.policy.validate_bitrate(bitrate))?;
                args.extend(["-b:a".to_string(), bitrate.to_string()]);
            }
        }

        if let Some(resolution) = spec.params.resolution() {
            self.recheck("resolution", self.policy.validate_resolution(resolution))?;
            args.extend(["-s".to_string(), resolution.to_string()]);
        }

        if let Some(framerate) = spec.params.framerate() {
            self.recheck("framerate", self.policy.validate_framerate(framerate))?;
            args.extend(["-r".to_string(), framerate.to_string()]);
        }

        args.extend(["-y".to_string(), as_encoder_operand(spec.output)]);

        debug!(args = ?args, "Built conversion command");
        Ok(self.finish(args))
    }

    /// Build an audio extraction command:
    /// `-i <in> -vn -c:a <codec> [-b:a] [-ar] [-ac] [-compression_level] -y <out>`
    pub fn build_extract(
        &self,
        input: &str,
        output: &str,
        plan: &AudioPlan,
    ) -> TranscodeResult<EncoderCommand> {
        let mut args = Vec::new();
        self.push_paths_input(&mut args, input, output)?;
        args.push("-vn".to_string());

        self.push_codec(&mut args, "-c:a", &plan.codec, CodecKind::Audio)?;

        if let Some(bitrate) = plan.bitrate.as_deref() {
            self.recheck("audio bitrate", self.policy.validate_bitrate(bitrate))?;
            args.extend(["-b:a".to_string(), bitrate.to_string()]);
        }

        if let Some(rate) = plan.sample_rate.as_deref() {
            self.recheck("sample rate", self.policy.validate_sample_rate(rate))?;
            args.extend(["-ar".to_string(), rate.to_string()]);
        }

        if let Some(channels) = plan.channels.as_deref() {
            self.recheck("channels", self.policy.validate_channels(channels))?;
            args.extend(["-ac".to_string(), channels.to_string()]);
        }

        if let Some(level) = plan.compression_level.as_deref() {
            self.recheck(
                "compression level",
                self.policy.validate_compression_level(level),
            )?;
            args.extend(["-compression_level".to_string(), level.to_string()]);
        }

        args.extend(["-y".to_string(), as_encoder_operand(output)]);

        debug!(args = ?args, "Built extraction command");
        Ok(self.finish(args))
    }

    fn push_paths_input(
        &self,
        args: &mut Vec<String>,
        input: &str,
        output: &str,
    ) -> TranscodeResult<()> {
        self.recheck("input path", self.policy.validate_file_path(input))?;
        self.recheck("output path", self.policy.validate_file_path(output))?;
        self.recheck("output format", self.policy.validate_file_format(output))?;

        args.extend(["-i".to_string(), as_encoder_operand(input)]);
        Ok(())
    }

    fn push_codec(
        &self,
        args: &mut Vec<String>,
        flag: &str,
        codec: &str,
        kind: CodecKind,
    ) -> TranscodeResult<()> {
        let field = match kind {
            CodecKind::Video => "video codec",
            CodecKind::Audio => "audio codec",
        };
        self.recheck(field, self.policy.validate_codec(codec, kind))?;
        args.extend([flag.to_string(), codec.to_string()]);
        Ok(())
    }

    fn recheck(&self, field: &str, verdict: Result<(), ValidationError>) -> TranscodeResult<()> {
        verdict.map_err(|e| TranscodeError::BuildError {
            message: format!("{} failed re-validation: {}", field, e),
        })
    }

    fn finish(&self, args: Vec<String>) -> EncoderCommand {
        EncoderCommand {
            program: self.program.to_string(),
            args,
        }
    }
}
