// Application layer - Use case interactors

pub mod container;
pub mod convert_interactor;
pub mod extract_interactor;
pub mod inspect_interactor;

use crate::adapters::toml_config::AppConfig;
use crate::planner::Preset;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use convert_interactor::{ConvertInteractor, ConvertRequest, ConvertResponse};
pub use extract_interactor::{ExtractInteractor, ExtractRequest, ExtractResponse};
pub use inspect_interactor::{InspectFormat, InspectInteractor, InspectRequest, InspectResponse};

/// Encoder settings shared by the execution use cases
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub ffmpeg_path: String,
    /// Seconds between statistics lines in tracked mode
    pub stats_period: f64,
    pub default_preset: Preset,
}

impl From<&AppConfig> for EncoderSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            stats_period: config.stats_period,
            default_preset: config.default_preset,
        }
    }
}
