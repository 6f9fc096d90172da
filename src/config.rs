use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the LexBrief server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Completion provider used for all pipeline stages.
    pub completion_provider: CompletionProvider,
    /// Model identifier passed to the provider.
    pub completion_model: String,
    /// API key for the Gemini API (required when the provider is Gemini).
    pub gemini_api_key: Option<String>,
    /// Optional override for the Gemini API origin.
    pub gemini_base_url: Option<String>,
    /// Optional override for the Ollama runtime URL.
    pub ollama_url: Option<String>,
    /// Per-stage call timeout in milliseconds.
    pub stage_timeout_ms: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Default per-stage timeout applied when `STAGE_TIMEOUT_MS` is unset.
pub const DEFAULT_STAGE_TIMEOUT_MS: u64 = 60_000;

/// Supported completion backends for the analysis pipeline.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    /// Hosted Google Gemini API.
    Gemini,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let completion_provider: CompletionProvider =
            load_env("COMPLETION_PROVIDER")?.parse().map_err(|()| {
                ConfigError::InvalidValue("Invalid COMPLETION_PROVIDER".to_string())
            })?;
        let gemini_api_key = load_env_optional("GEMINI_API_KEY");
        if matches!(completion_provider, CompletionProvider::Gemini) && gemini_api_key.is_none() {
            return Err(ConfigError::MissingVariable("GEMINI_API_KEY".to_string()));
        }
        Ok(Self {
            completion_provider,
            completion_model: load_env("COMPLETION_MODEL")?,
            gemini_api_key,
            gemini_base_url: load_env_optional("GEMINI_BASE_URL"),
            ollama_url: load_env_optional("OLLAMA_URL"),
            stage_timeout_ms: load_env_optional("STAGE_TIMEOUT_MS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("STAGE_TIMEOUT_MS".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_STAGE_TIMEOUT_MS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for CompletionProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        provider = ?config.completion_provider,
        model = %config.completion_model,
        stage_timeout_ms = config.stage_timeout_ms,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
