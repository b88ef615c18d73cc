use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::error::DisplayErrorContext;

use crate::domain::{CacheError, ParameterSource};

#[cfg(test)]
use mockall::automock;

/// `GetParameters` accepts at most this many names per request
pub const MAX_NAMES_PER_REQUEST: usize = 10;

/// One `GetParameters` response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBatch {
    pub parameters: Vec<(String, String)>,
    /// Names the service did not recognise
    pub invalid: Vec<String>,
}

/// Trait for SSM client operations (for mocking)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SsmClientTrait: Send + Sync + std::fmt::Debug {
    async fn get_parameters(
        &self,
        names: &[String],
        with_decryption: bool,
    ) -> Result<ParameterBatch, CacheError>;
}

/// Real SSM client wrapper
#[derive(Debug)]
pub struct RealSsmClient {
    client: SsmClient,
}

impl RealSsmClient {
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SsmClientTrait for RealSsmClient {
    async fn get_parameters(
        &self,
        names: &[String],
        with_decryption: bool,
    ) -> Result<ParameterBatch, CacheError> {
        let response = self
            .client
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .with_decryption(with_decryption)
            .send()
            .await
            .map_err(|e| {
                CacheError::source(
                    "ssm",
                    format!("GetParameters failed: {}", DisplayErrorContext(&e)),
                )
            })?;

        let parameters = response
            .parameters()
            .iter()
            .filter_map(|p| Some((p.name()?.to_string(), p.value()?.to_string())))
            .collect();

        Ok(ParameterBatch {
            parameters,
            invalid: response.invalid_parameters().to_vec(),
        })
    }
}

/// Parameter source backed by SSM Parameter Store
#[derive(Debug)]
pub struct SsmParameterSource<C: SsmClientTrait> {
    client: C,
    with_decryption: bool,
}

impl SsmParameterSource<RealSsmClient> {
    /// Build a client from the default AWS configuration chain
    pub async fn new(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        Self::with_client(RealSsmClient::new(SsmClient::new(&config)))
    }
}

impl<C: SsmClientTrait> SsmParameterSource<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            with_decryption: true,
        }
    }

    pub fn with_decryption(mut self, with_decryption: bool) -> Self {
        self.with_decryption = with_decryption;
        self
    }
}

#[async_trait]
impl<C: SsmClientTrait> ParameterSource for SsmParameterSource<C> {
    async fn fetch(&self, names: &[String]) -> Result<HashMap<String, String>, CacheError> {
        let mut params = HashMap::with_capacity(names.len());

        for chunk in names.chunks(MAX_NAMES_PER_REQUEST) {
            let batch = self
                .client
                .get_parameters(chunk, self.with_decryption)
                .await?;

            if !batch.invalid.is_empty() {
                tracing::warn!(
                    invalid = %batch.invalid.join(","),
                    "SSM reported invalid parameters"
                );
            }

            params.extend(batch.parameters);
        }

        Ok(params)
    }

    fn source_name(&self) -> &'static str {
        "ssm"
    }
}
