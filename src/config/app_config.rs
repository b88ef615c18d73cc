use serde::Deserialize;

use crate::domain::{DEFAULT_EXPIRY_MS, FallbackPolicy};
use crate::infrastructure::source::SourceConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Settings for the long-lived cache built by the CLI
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Parameter names to cache
    #[serde(default)]
    pub keys: Vec<String>,
    /// Freshness window in milliseconds; must be positive
    #[serde(default = "default_expiry_ms")]
    pub expiry_ms: i64,
    #[serde(default)]
    pub fallback: FallbackPolicy,
}

fn default_expiry_ms() -> i64 {
    DEFAULT_EXPIRY_MS as i64
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            expiry_ms: default_expiry_ms(),
            fallback: FallbackPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cache.keys"),
            )
            .build()?;

        config.try_deserialize()
    }
}
