use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use sentinel_application::{AnalyzeCallUseCase, AnalyzeCallUseCaseImpl};
use sentinel_configuration::{AppConfig, RecognizerConfig, ServerConfig};
use sentinel_domain::{KeywordScorer, SpeechRecognitionPort, WaveformAnalysisPort};
use sentinel_http::create_app_routes;
use sentinel_infra_asr_rest::{RecognizerAdapterConfig, RestSpeechRecognizer};
use sentinel_infra_dsp::{DspAdapterConfig, DspWaveformAnalyzer};

pub async fn build_and_run(config: AppConfig, server_config: ServerConfig) -> Result<(), Error> {
    let app = Application::new(config)?;
    app.run(server_config).await
}

pub struct Application {
    pub config: AppConfig,
    pub usecase: Arc<dyn AnalyzeCallUseCase>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        tracing::info!(
            recognizer_url = %config.service.recognizer.base_url,
            lexicon_size = config.service.scoring.lexicon.len(),
            scan_failure_text = config.service.scoring.scan_failure_text,
            "initializing call analysis application"
        );

        let recognizer: Arc<dyn SpeechRecognitionPort> =
            Arc::new(RestSpeechRecognizer::new(RecognizerAdapterConfig {
                base_url: config.service.recognizer.base_url.clone(),
                language: config.service.recognizer.language.clone(),
                request_timeout: request_timeout(&config.service.recognizer),
            })?);
        let waveform: Arc<dyn WaveformAnalysisPort> =
            Arc::new(DspWaveformAnalyzer::new(DspAdapterConfig {
                frame_len: config.service.audio.frame_len,
                hop_len: config.service.audio.hop_len,
                top_db: config.service.audio.top_db,
            }));
        let scorer = KeywordScorer::new(config.service.scoring.lexicon.clone());
        let usecase: Arc<dyn AnalyzeCallUseCase> = Arc::new(AnalyzeCallUseCaseImpl::new(
            recognizer,
            waveform,
            scorer,
            config.service.scoring.scan_failure_text,
        ));

        Ok(Self { config, usecase })
    }

    pub async fn run(self, server_config: ServerConfig) -> Result<(), Error> {
        tracing::info!(
            host = %server_config.host,
            port = server_config.port,
            "starting call-sentinel http server"
        );

        let router = create_app_routes(self.usecase, server_config.max_body_bytes);
        let listener =
            tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.port))
                .await?;
        axum::serve(listener, router)
            .await
            .map_err(|err| anyhow::anyhow!("http server failed: {err}"))
    }
}

fn request_timeout(config: &RecognizerConfig) -> Duration {
    Duration::from_millis(config.request_timeout_ms.max(1))
}
