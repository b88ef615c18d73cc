use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::CacheError;

#[cfg(test)]
use mockall::automock;

/// Trait for parameter sources (SSM Parameter Store, process environment, etc.)
///
/// A source returns whatever subset of the requested names it knows about;
/// completeness is checked by the cache, not here.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParameterSource: Send + Sync + Debug {
    /// Fetch decrypted values for the given names
    async fn fetch(&self, names: &[String]) -> Result<HashMap<String, String>, CacheError>;

    /// Source name for logging/debugging
    fn source_name(&self) -> &'static str;
}
