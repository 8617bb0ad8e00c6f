use crate::ml::{ModelKind, VectorizerConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Artifact storage configuration
    pub artifacts: ArtifactsConfig,

    /// Training pipeline configuration
    pub training: TrainingConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: SENTIMENT_)
            .add_source(
                config::Environment::with_prefix("SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifacts: ArtifactsConfig::default(),
            training: TrainingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding vectorizer.bin, model.bin and manifest.json
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Seed for shuffling and splitting
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Fraction of examples held out for evaluation, in (0, 1)
    #[serde(default = "default_test_split")]
    pub test_split: f64,

    /// Minimum labeled examples required per class
    #[serde(default = "default_min_examples_per_class")]
    pub min_examples_per_class: usize,

    /// Which classifier family to train
    #[serde(default = "default_model")]
    pub model: ModelKind,

    /// Root directory for per-run tracking records
    #[serde(default = "default_runs_dir")]
    pub runs_dir: PathBuf,

    /// Vectorizer hyperparameters
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Logistic regression hyperparameters
    #[serde(default)]
    pub logistic: LogisticConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            test_split: default_test_split(),
            min_examples_per_class: default_min_examples_per_class(),
            model: default_model(),
            runs_dir: default_runs_dir(),
            vectorizer: VectorizerConfig::default(),
            logistic: LogisticConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// L2 regularization strength
    #[serde(default = "default_l2_penalty")]
    pub l2_penalty: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            l2_penalty: default_l2_penalty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: default_true(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_seed() -> u64 {
    42
}

fn default_test_split() -> f64 {
    0.2
}

fn default_min_examples_per_class() -> usize {
    10
}

fn default_model() -> ModelKind {
    ModelKind::LogisticRegression
}

fn default_runs_dir() -> PathBuf {
    PathBuf::from("runs")
}

fn default_l2_penalty() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
