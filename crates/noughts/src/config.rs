//! Application configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider, RetryPolicy};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default name for the X player.
    #[serde(default = "default_player_x_name")]
    player_x_name: String,

    /// Default name for the O player in two-player games.
    #[serde(default = "default_player_o_name")]
    player_o_name: String,

    /// Name shown for the computer opponent.
    #[serde(default = "default_computer_name")]
    computer_name: String,

    /// Pause before the computer moves, in milliseconds.
    #[serde(default = "default_computer_delay_ms")]
    computer_delay_ms: u64,

    /// Coach (language model) settings.
    #[serde(default)]
    coach: CoachConfig,
}

/// Language-model settings for tips and analysis.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct CoachConfig {
    /// LLM provider (gemini, openai or anthropic).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Attempts per request while rate limited, including the first.
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Delay before the first retry, in milliseconds. Doubles each retry.
    #[serde(default = "default_initial_backoff_ms")]
    initial_backoff_ms: u64,

    /// Overrides the provider's API base URL (proxies, local gateways).
    #[serde(default)]
    base_url: Option<String>,
}

fn default_player_x_name() -> String {
    "Player X".to_string()
}

fn default_player_o_name() -> String {
    "Player O".to_string()
}

fn default_computer_name() -> String {
    "AI".to_string()
}

fn default_computer_delay_ms() -> u64 {
    600
}

fn default_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player_x_name: default_player_x_name(),
            player_o_name: default_player_o_name(),
            computer_name: default_computer_name(),
            computer_delay_ms: default_computer_delay_ms(),
            coach: CoachConfig::default(),
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            base_url: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.coach.provider, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Computer thinking delay.
    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.computer_delay_ms)
    }
}

impl CoachConfig {
    /// Retry policy for coach requests.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
        )
    }

    /// Builds the LLM configuration, reading the provider's API key from
    /// the environment.
    #[instrument(skip(self), fields(provider = ?self.provider, model = %self.model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;
        self.llm_config_with_key(api_key)
    }

    /// Builds the LLM configuration with an explicit API key.
    pub fn llm_config_with_key(&self, api_key: String) -> Result<LlmConfig, ConfigError> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::new("API key is empty".to_string()));
        }
        let config = LlmConfig::new(
            self.provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
        )
        .with_retry(self.retry_policy());
        Ok(match &self.base_url {
            Some(base_url) => config.with_api_base(base_url.clone()),
            None => config,
        })
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
