//! Service configuration
//!
//! Built once at startup from defaults, an optional config file, `PLANTPICK__*`
//! environment overrides and the two credential variables. The resulting
//! [`Config`] is immutable and shared with the upstream clients.

use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Credential for the vision model endpoint
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Credential for the marketplace search endpoint
pub const SHOPEE_API_KEY_VAR: &str = "SHOPEE_API_KEY";
/// Names the optional configuration file
pub const CONFIG_PATH_VAR: &str = "PLANTPICK_CONFIG";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required credential: set {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub shopee: ShopeeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for a request body, uploads included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

/// Vision model (OpenAI chat completions) settings
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_openai_timeout_ms")]
    pub timeout_ms: u64,
}

/// Marketplace search settings
#[derive(Debug, Clone, Deserialize)]
pub struct ShopeeConfig {
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,

    #[serde(default = "default_shopee_base_url")]
    pub base_url: String,

    #[serde(default = "default_shopee_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_max_upload_bytes() -> usize { 20 * 1024 * 1024 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> LogFormat { LogFormat::Pretty }
fn empty_secret() -> SecretString { SecretString::new(String::new()) }
fn default_openai_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_openai_model() -> String { "gpt-4o".to_string() }
fn default_max_tokens() -> u32 { 300 }
fn default_openai_timeout_ms() -> u64 { 60_000 }
fn default_shopee_base_url() -> String { "https://shopee-api.com".to_string() }
fn default_shopee_timeout_ms() -> u64 { 10_000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_openai_timeout_ms(),
        }
    }
}

impl Default for ShopeeConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            base_url: default_shopee_base_url(),
            timeout_ms: default_shopee_timeout_ms(),
        }
    }
}

impl OpenAiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ShopeeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// `PLANTPICK__SECTION__KEY` overrides. Origins are a comma-separated list.
fn environment() -> Environment {
    Environment::with_prefix("PLANTPICK")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_allowed_origins")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the
    /// process environment, then validate it.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config".to_string());

        let builder = config::Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(environment())
            .set_override_option("openai.api_key", std::env::var(OPENAI_API_KEY_VAR).ok())?
            .set_override_option("shopee.api_key", std::env::var(SHOPEE_API_KEY_VAR).ok())?;

        Self::from_builder(builder)
    }

    /// Build from an arbitrary source stack. Used by [`Config::load`] and by tests.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingCredential(OPENAI_API_KEY_VAR));
        }
        if self.shopee.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingCredential(SHOPEE_API_KEY_VAR));
        }
        if self.openai.timeout_ms == 0 || self.shopee.timeout_ms == 0 {
            return Err(ConfigError::Invalid("upstream timeouts must be non-zero".to_string()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Socket address string the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
