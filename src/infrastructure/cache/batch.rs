use std::collections::HashMap;
use std::sync::Arc;

use super::ExpiringConfigCache;
use crate::domain::{CacheError, ParameterSource};

/// Read every key once through a throwaway cache
///
/// A new cache is built on each call, so nothing is reused between calls;
/// callers that read repeatedly should hold an [`ExpiringConfigCache`].
pub async fn batch_read<I, S>(
    source: Arc<dyn ParameterSource>,
    keys: I,
) -> Result<HashMap<String, String>, CacheError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let cache = ExpiringConfigCache::create(source, keys, None)?;
    cache.values().await
}
