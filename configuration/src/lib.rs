use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

pub use config::ConfigError;

pub type AppConfig = SentinelConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
    #[serde(default = "default_hop_len")]
    pub hop_len: usize,
    #[serde(default = "default_top_db")]
    pub top_db: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    #[serde(default = "default_recognizer_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_lexicon")]
    pub lexicon: Vec<String>,
    /// When a transcription fails, scan (and surface) the failure message
    /// as if it were the transcript. Mirrors the original behavior of the
    /// detector; disable to scan an empty transcript instead.
    #[serde(default = "default_scan_failure_text")]
    pub scan_failure_text: bool,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            recognizer: RecognizerConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frame_len: default_frame_len(),
            hop_len: default_hop_len(),
            top_db: default_top_db(),
        }
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_recognizer_url(),
            request_timeout_ms: default_request_timeout_ms(),
            language: default_language(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            lexicon: default_lexicon(),
            scan_failure_text: default_scan_failure_text(),
        }
    }
}

/// Environment overrides use the `CALL_SENTINEL` prefix with `__` as the
/// section separator, e.g. `CALL_SENTINEL_SERVER__PORT=9090`. An optional
/// file given via `CALL_SENTINEL_CONFIG` is read first.
pub fn load_config() -> Result<SentinelConfig, ConfigError> {
    let mut builder = config::Config::builder();
    if let Ok(path) = std::env::var("CALL_SENTINEL_CONFIG") {
        builder = builder.add_source(config::File::with_name(&path));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix("CALL_SENTINEL").separator("__"))
        .build()?;
    let mut loaded: SentinelConfig = settings.try_deserialize()?;
    if loaded.service.scoring.lexicon.is_empty() {
        loaded.service.scoring.lexicon = default_lexicon();
    }
    Ok(loaded)
}

pub fn setup_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_frame_len() -> usize {
    2_048
}

fn default_hop_len() -> usize {
    512
}

fn default_top_db() -> f32 {
    20.0
}

fn default_recognizer_url() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_scan_failure_text() -> bool {
    true
}

fn default_lexicon() -> Vec<String> {
    [
        "gift card",
        "urgent",
        "wire transfer",
        "social security",
        "police",
        "arrest",
        "verify your account",
        "otp",
        "password",
        "refund",
        "amazon",
        "bank account",
    ]
    .map(str::to_string)
    .to_vec()
}
