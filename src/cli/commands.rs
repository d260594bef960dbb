//! Command implementations

use anyhow::Result;
use thiserror::Error;
use tracing::info;

use crate::app::{
    AppContainer, ConvertRequest, DefaultAppContainer, ExtractRequest, InspectRequest,
};
use crate::cli::args::{ConvertArgs, ExtractArgs, InfoArgs, ProgressFormat};
use crate::engine::progress::{
    ConsoleProgressCallback, JsonProgressCallback, NoOpProgressCallback, ProgressCallback,
};
use crate::error::{ErrorCategory, TranscodeError};
use crate::ports::ExecutionMode;

/// Global output switches
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub verbose: bool,
    pub quiet: bool,
}

/// A failure already shown to the user through the progress output
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReportedFailure(pub TranscodeError);

/// Execute the convert command
pub async fn convert(
    container: &DefaultAppContainer,
    args: ConvertArgs,
    output: OutputOptions,
) -> Result<()> {
    let interactor = container.convert_interactor();
    let request = ConvertRequest {
        params: args.custom_parameters(),
        input_path: args.input,
        output_path: args.output,
        preset: args.preset,
        overwrite: args.force,
        mode: execution_mode(output),
    };

    // Reject bad parameters before looking for any external tool
    interactor.validate(&request)?;
    container.check_tools(true).await?;

    let progress = progress_callback(args.progress, output);
    let response = match interactor.execute(&request, progress.as_ref()).await {
        Ok(response) => response,
        Err(e) => return Err(fail(progress.as_ref(), output, e)),
    };

    let method = if response.decision.stream_copy {
        "stream copy".to_string()
    } else {
        format!(
            "{}/{}",
            response.decision.video_codec, response.decision.audio_codec
        )
    };
    progress.on_complete(&format!(
        "Converted {} -> {} ({}) in {:.1}s",
        request.input_path,
        request.output_path,
        method,
        response.report.wall_time.as_secs_f64()
    ));

    info!("Convert operation completed successfully");
    Ok(())
}

/// Execute the extract command
pub async fn extract(
    container: &DefaultAppContainer,
    args: ExtractArgs,
    output: OutputOptions,
) -> Result<()> {
    let interactor = container.extract_interactor();
    let request = ExtractRequest {
        params: args.parameters(),
        input_path: args.input,
        output_path: args.output,
        quality: args.quality,
        overwrite: args.force,
        mode: execution_mode(output),
    };

    interactor.validate(&request)?;
    container.check_tools(true).await?;

    let progress = progress_callback(args.progress, output);
    let response = match interactor.execute(&request, progress.as_ref()).await {
        Ok(response) => response,
        Err(e) => return Err(fail(progress.as_ref(), output, e)),
    };

    progress.on_complete(&format!(
        "Extracted audio to {} ({}) in {:.1}s",
        request.output_path,
        response.plan.codec,
        response.report.wall_time.as_secs_f64()
    ));

    info!("Extract operation completed successfully");
    Ok(())
}

/// Execute the info command
pub async fn info(
    container: &DefaultAppContainer,
    args: InfoArgs,
    output: OutputOptions,
) -> Result<()> {
    let request = InspectRequest {
        input_path: args.input,
        format: args.format,
        detailed: args.detailed,
        output_path: args.output,
        overwrite: args.force,
    };

    let response = container.inspect_interactor().execute(&request).await?;

    match response.written_to {
        Some(path) if !output.quiet => println!("✅ Media information saved to: {}", path),
        Some(_) => {}
        None => print!("{}", response.report),
    }

    Ok(())
}

/// Process exit code for a failed command
pub fn exit_code(error: &anyhow::Error) -> u8 {
    let transcode_error = error
        .downcast_ref::<ReportedFailure>()
        .map(|reported| &reported.0)
        .or_else(|| error.downcast_ref::<TranscodeError>());

    match transcode_error {
        Some(TranscodeError::Cancelled) => 130,
        Some(e) if e.category() == ErrorCategory::Validation => 2,
        _ => 1,
    }
}

/// Diagnostics captured from a failed encoder run
pub fn diagnostics(error: &anyhow::Error) -> Option<&str> {
    error
        .downcast_ref::<ReportedFailure>()
        .map(|reported| &reported.0)
        .or_else(|| error.downcast_ref::<TranscodeError>())
        .and_then(TranscodeError::diagnostics)
}

fn execution_mode(output: OutputOptions) -> ExecutionMode {
    if output.verbose {
        ExecutionMode::PassThrough
    } else {
        ExecutionMode::Tracked
    }
}

fn progress_callback(format: ProgressFormat, output: OutputOptions) -> Box<dyn ProgressCallback> {
    if output.quiet {
        return Box::new(NoOpProgressCallback);
    }

    match format {
        ProgressFormat::Console => {
            Box::new(ConsoleProgressCallback::new().with_command_echo(output.verbose))
        }
        ProgressFormat::Json => {
            Box::new(JsonProgressCallback::new().with_command_echo(output.verbose))
        }
    }
}

/// Send the failure to the progress output; quiet runs leave it to the caller
fn fail(
    progress: &dyn ProgressCallback,
    output: OutputOptions,
    error: TranscodeError,
) -> anyhow::Error {
    if output.quiet {
        return error.into();
    }

    match &error {
        TranscodeError::Cancelled => progress.on_cancel(),
        other => progress.on_error(&other.to_string()),
    }
    ReportedFailure(error).into()
}
