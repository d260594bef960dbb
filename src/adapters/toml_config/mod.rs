// TOML config adapter - Configuration management using TOML files

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TranscodeError, TranscodeResult};
use crate::planner::Preset;
use crate::security::{SecurityPolicy, DEFAULT_MAX_PARAMETER_LENGTH, DEFAULT_MAX_PATH_LENGTH};
use crate::utils::logging::{validate_level, LogFormat};

const MAX_STATS_PERIOD: f64 = 10.0;

/// Application configuration, read from the `[transcoder]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Encoder binary
    pub ffmpeg_path: String,
    /// Prober binary
    pub ffprobe_path: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Quality tier used when none is given on the command line
    pub default_preset: Preset,
    /// Seconds between encoder statistics lines in tracked mode
    pub stats_period: f64,
    /// Kill the encoder after this many seconds; 0 disables the limit
    pub encoder_timeout_secs: u64,
    pub max_path_length: usize,
    pub max_parameter_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Compact,
            default_preset: Preset::Medium,
            stats_period: 0.2,
            encoder_timeout_secs: 0,
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_parameter_length: DEFAULT_MAX_PARAMETER_LENGTH,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    transcoder: AppConfig,
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> TranscodeResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| TranscodeError::Config {
            message: format!("failed to parse TOML config: {}", e),
        })?;
        Ok(file.transcoder)
    }

    /// Load configuration from a TOML file
    pub fn load_file(path: &Path) -> TranscodeResult<Self> {
        if !path.exists() {
            return Err(TranscodeError::Config {
                message: format!("config file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| TranscodeError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;

        info!("Loading configuration from: {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Serialize to a TOML document with a `[transcoder]` table
    pub fn to_toml_string(&self) -> TranscodeResult<String> {
        toml::to_string(&ConfigFile {
            transcoder: self.clone(),
        })
        .map_err(|e| TranscodeError::Config {
            message: format!("failed to serialize config: {}", e),
        })
    }

    /// Apply `TRANSCODER_*` overrides obtained through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> TranscodeResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        if let Some(value) = lookup("TRANSCODER_FFMPEG_PATH") {
            self.ffmpeg_path = value;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_FFPROBE_PATH") {
            self.ffprobe_path = value;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_LOG_LEVEL") {
            self.log_level = value;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_LOG_FORMAT") {
            self.log_format = value.parse().map_err(config_error)?;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_DEFAULT_PRESET") {
            self.default_preset = value.parse().map_err(config_error)?;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_STATS_PERIOD") {
            self.stats_period = value.trim().parse().map_err(|e| TranscodeError::Config {
                message: format!("invalid TRANSCODER_STATS_PERIOD {:?}: {}", value, e),
            })?;
            applied += 1;
        }
        if let Some(value) = lookup("TRANSCODER_TIMEOUT_SECS") {
            self.encoder_timeout_secs =
                value.trim().parse().map_err(|e| TranscodeError::Config {
                    message: format!("invalid TRANSCODER_TIMEOUT_SECS {:?}: {}", value, e),
                })?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Validate configuration values
    pub fn validate(&self) -> TranscodeResult<()> {
        validate_level(&self.log_level)?;

        if self.ffmpeg_path.trim().is_empty() || self.ffprobe_path.trim().is_empty() {
            return Err(config_error("tool paths must not be empty".to_string()));
        }

        if !(self.stats_period > 0.0 && self.stats_period <= MAX_STATS_PERIOD) {
            return Err(config_error(format!(
                "stats_period must be in (0, {}], got {}",
                MAX_STATS_PERIOD, self.stats_period
            )));
        }

        if self.max_path_length == 0 || self.max_parameter_length == 0 {
            return Err(config_error(
                "length limits must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// The single immutable policy passed to every validator call
    pub fn security_policy(&self) -> SecurityPolicy {
        SecurityPolicy::with_limits(self.max_path_length, self.max_parameter_length)
    }

    /// Encoder deadline, if one is configured
    pub fn encoder_timeout(&self) -> Option<Duration> {
        (self.encoder_timeout_secs > 0).then(|| Duration::from_secs(self.encoder_timeout_secs))
    }
}

fn config_error(message: String) -> TranscodeError {
    TranscodeError::Config { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.encoder_timeout(), None);
        assert_eq!(config.security_policy(), SecurityPolicy::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [transcoder]
            ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
            default_preset = "high"
            encoder_timeout_secs = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.default_preset, Preset::High);
        assert_eq!(config.encoder_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.ffprobe_path, "ffprobe");
        assert_eq!(config.stats_period, 0.2);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[transcoder\nffmpeg_path = 1"),
            Err(TranscodeError::Config { .. })
        ));
        assert!(AppConfig::from_toml_str("[transcoder]\nstats_period = \"fast\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.log_format = LogFormat::Json;
        config.max_path_length = 1024;

        let text = config.to_toml_string().unwrap();
        assert!(text.contains("[transcoder]"));
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[transcoder]\nlog_level = \"debug\"").unwrap();

        let config = AppConfig::load_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");

        assert!(AppConfig::load_file(Path::new("/nonexistent/transcoder.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TRANSCODER_FFPROBE_PATH", "/usr/local/bin/ffprobe"),
            ("TRANSCODER_DEFAULT_PRESET", "LOW"),
            ("TRANSCODER_STATS_PERIOD", "0.5"),
            ("TRANSCODER_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        let applied = config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(applied, 4);
        assert_eq!(config.ffprobe_path, "/usr/local/bin/ffprobe");
        assert_eq!(config.default_preset, Preset::Low);
        assert_eq!(config.stats_period, 0.5);
        assert_eq!(config.encoder_timeout_secs, 30);
    }

    #[test]
    fn test_bad_env_value_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| {
            (key == "TRANSCODER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(TranscodeError::Config { .. })));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.stats_period = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.stats_period = 11.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.max_parameter_length = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_level = "chatty".to_string();
        assert!(config.validate().is_err());
    }
}
