use std::sync::Arc;

use super::expiring::CacheCore;
use crate::domain::CacheError;

/// Lazy accessor for one configured key
///
/// Each read checks staleness on its own and refreshes the whole cache when
/// needed, so views of different keys may be read concurrently.
#[derive(Clone)]
pub struct KeyView {
    name: Arc<str>,
    core: Arc<CacheCore>,
}

impl KeyView {
    pub(super) fn new(name: &str, core: Arc<CacheCore>) -> Self {
        Self {
            name: Arc::from(name),
            core,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, refreshed from the source first if the cache is stale
    pub async fn get(&self) -> Result<String, CacheError> {
        self.core.read(&self.name).await
    }
}

impl std::fmt::Debug for KeyView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyView").field("name", &self.name).finish()
    }
}
