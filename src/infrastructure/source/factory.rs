use serde::Deserialize;
use std::sync::Arc;

use super::{EnvParameterSource, SsmParameterSource};
use crate::domain::{CacheError, ParameterSource};

/// Deployment context name; only `production` talks to the parameter store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DeploymentContext(String);

impl DeploymentContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn production() -> Self {
        Self::new("production")
    }

    pub fn is_production(&self) -> bool {
        self.0.eq_ignore_ascii_case("production")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeploymentContext {
    fn default() -> Self {
        Self::new("development")
    }
}

impl std::fmt::Display for DeploymentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameter source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub context: DeploymentContext,
    /// AWS region override; the default provider chain is used when unset
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_true")]
    pub with_decryption: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            context: DeploymentContext::default(),
            region: None,
            with_decryption: true,
        }
    }
}

/// Factory for creating parameter sources
#[derive(Debug)]
pub struct SourceFactory;

impl SourceFactory {
    /// Create the parameter source for the configured deployment context
    pub async fn create(config: &SourceConfig) -> Result<Arc<dyn ParameterSource>, CacheError> {
        if config.context.is_production() {
            let source = SsmParameterSource::new(config.region.clone())
                .await
                .with_decryption(config.with_decryption);

            tracing::info!(
                context = %config.context,
                region = ?config.region,
                "Using SSM Parameter Store source"
            );
            return Ok(Arc::new(source));
        }

        tracing::info!(context = %config.context, "Using environment variable source");
        Ok(Arc::new(EnvParameterSource::new()))
    }
}
