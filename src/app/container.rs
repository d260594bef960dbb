use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adapters::probe_ffprobe::FfprobeAdapter;
use crate::adapters::toml_config::AppConfig;
use crate::app::{
    convert_interactor::ConvertInteractor, extract_interactor::ExtractInteractor,
    inspect_interactor::InspectInteractor, EncoderSettings,
};
use crate::engine::monitor::ProgressMonitor;
use crate::error::TranscodeResult;
use crate::ports::{ExecutePort, ProbePort};
use crate::security::SecurityPolicy;

pub trait AppContainer: Send + Sync {
    fn convert_interactor(&self) -> Arc<ConvertInteractor>;
    fn extract_interactor(&self) -> Arc<ExtractInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    probe_port: Arc<dyn ProbePort>,
    execute_port: Arc<dyn ExecutePort>,
    convert_interactor: Arc<ConvertInteractor>,
    extract_interactor: Arc<ExtractInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the external tools named in `config`; `cancel` aborts running encoders
    pub fn new(config: &AppConfig, cancel: CancellationToken) -> Self {
        let policy = Arc::new(config.security_policy());
        let settings = EncoderSettings::from(config);

        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(&config.ffprobe_path));
        let execute_port: Arc<dyn ExecutePort> = Arc::new(
            ProgressMonitor::new(&config.ffmpeg_path, cancel)
                .with_timeout(config.encoder_timeout()),
        );

        let convert_interactor = Arc::new(ConvertInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            Arc::clone(&policy),
            settings.clone(),
        ));

        let extract_interactor = Arc::new(ExtractInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&execute_port),
            Arc::clone(&policy),
            settings,
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&policy),
        ));

        Self {
            probe_port,
            execute_port,
            convert_interactor,
            extract_interactor,
            inspect_interactor,
        }
    }

    /// Fail early with `ToolUnavailable` when the prober or the encoder is missing
    pub async fn check_tools(&self, need_encoder: bool) -> TranscodeResult<()> {
        self.probe_port.check_available().await?;
        if need_encoder {
            self.execute_port.check_available().await?;
        }
        Ok(())
    }
}

impl AppContainer for DefaultAppContainer {
    fn convert_interactor(&self) -> Arc<ConvertInteractor> {
        Arc::clone(&self.convert_interactor)
    }

    fn extract_interactor(&self) -> Arc<ExtractInteractor> {
        Arc::clone(&self.extract_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
