//! Transcoder CLI
//!
//! # Usage
//!
//! ```bash
//! transcoder convert input.mov output.mp4 --preset high
//! transcoder extract input.mp4 audio.flac --quality high
//! transcoder info input.mkv --detailed
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use transcoder_cli::app::DefaultAppContainer;
use transcoder_cli::cli::commands::{self, OutputOptions, ReportedFailure};
use transcoder_cli::cli::{Cli, Commands};
use transcoder_cli::config_initialization::{load_configuration, ConfigOverrides};
use transcoder_cli::utils::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<ReportedFailure>().is_none() {
                eprintln!("Error: {:#}", e);
            }
            if let Some(diagnostics) = commands::diagnostics(&e) {
                eprintln!("\nEncoder output:\n{}", diagnostics);
            }
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_configuration(&ConfigOverrides::from(&cli))
        .context("Failed to load configuration")?;
    init_logging(&config.log_level, config.log_format)?;
    debug!(?config, "Configuration loaded");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping encoder");
                on_interrupt.cancel();
            }
            Err(e) => warn!("Failed to listen for interrupt: {}", e),
        }
    });

    let container = DefaultAppContainer::new(&config, cancel);
    let output = OutputOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Convert(args) => {
            info!("Executing convert command");
            commands::convert(&container, args, output).await
        }
        Commands::Extract(args) => {
            info!("Executing extract command");
            commands::extract(&container, args, output).await
        }
        Commands::Info(args) => {
            info!("Executing info command");
            commands::info(&container, args, output).await
        }
    }
}
