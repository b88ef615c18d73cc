use std::collections::HashMap;
use std::env;

use async_trait::async_trait;

use crate::domain::{CacheError, ParameterSource};

/// Parameter source that reads process environment variables named after the keys
///
/// Unset variables are left out of the result rather than reported here, so
/// the cache's completeness check names them.
#[derive(Debug, Default)]
pub struct EnvParameterSource;

impl EnvParameterSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ParameterSource for EnvParameterSource {
    async fn fetch(&self, names: &[String]) -> Result<HashMap<String, String>, CacheError> {
        let mut params = HashMap::with_capacity(names.len());

        for name in names {
            match env::var(name) {
                Ok(value) => {
                    params.insert(name.clone(), value);
                }
                Err(e) => {
                    tracing::debug!(name = %name, error = %e, "Environment variable unavailable");
                }
            }
        }

        Ok(params)
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}
