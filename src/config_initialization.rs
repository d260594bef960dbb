//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::toml_config::AppConfig;
use crate::error::TranscodeResult;
use crate::utils::logging::LogFormat;

/// Files searched, in order, when no `--config` is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["transcoder.toml", "config/transcoder.toml"];

/// Values given on the command line, the highest-precedence layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Load configuration following precedence: CLI > Env > File > Defaults
pub fn load_configuration(overrides: &ConfigOverrides) -> TranscodeResult<AppConfig> {
    load_configuration_with(overrides, |key| std::env::var(key).ok())
}

/// [`load_configuration`] with an injectable environment lookup
pub fn load_configuration_with<F>(overrides: &ConfigOverrides, env: F) -> TranscodeResult<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match config_file(overrides) {
        Some(path) => AppConfig::load_file(&path)?,
        None => AppConfig::default(),
    };

    let env_overrides = config.apply_env(env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = overrides.log_format {
        config.log_format = format;
    }

    config.validate()?;
    Ok(config)
}

/// An explicit `--config` must exist; otherwise the first default path found
fn config_file(overrides: &ConfigOverrides) -> Option<PathBuf> {
    if let Some(path) = &overrides.config_file {
        return Some(path.clone());
    }

    DEFAULT_CONFIG_PATHS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf)
}
