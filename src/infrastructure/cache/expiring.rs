//! Expiring config cache
//!
//! Holds one snapshot of every configured key with a single expiration time.
//! A read that finds the snapshot stale refreshes the whole key set from the
//! parameter source. Concurrent stale reads share one in-flight refresh and
//! all wait for its outcome. When a refresh fails and older values exist, the
//! fail-soft policy serves the old values and reports the error to
//! `refreshError` listeners instead of the reader.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use tokio::sync::broadcast;

use super::key_view::KeyView;
use super::notifier::RefreshNotifier;
use crate::domain::{
    CacheError, Clock, Expiry, FallbackPolicy, KeySet, ListenerId, ParameterSource,
    RefreshEvent, SystemClock,
};

type RefreshFlight = Shared<BoxFuture<'static, Result<(), CacheError>>>;

/// Cached values and the instant they stop being fresh
#[derive(Debug)]
struct CacheState {
    expiration: DateTime<Utc>,
    items: HashMap<String, String>,
}

impl CacheState {
    fn empty() -> Self {
        Self {
            expiration: DateTime::UNIX_EPOCH,
            items: HashMap::new(),
        }
    }
}

/// Shared state behind a cache and all of its key views
pub(super) struct CacheCore {
    source: Arc<dyn ParameterSource>,
    keys: KeySet,
    expiry: Expiry,
    policy: FallbackPolicy,
    clock: Arc<dyn Clock>,
    state: RwLock<CacheState>,
    in_flight: Mutex<Option<RefreshFlight>>,
    notifier: RefreshNotifier,
}

impl CacheCore {
    fn is_stale(&self) -> bool {
        self.clock.now() >= self.state().expiration
    }

    fn has_items(&self) -> bool {
        !self.state().items.is_empty()
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn in_flight(&self) -> std::sync::MutexGuard<'_, Option<RefreshFlight>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn value(&self, key: &str) -> Result<String, CacheError> {
        self.state()
            .items
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::missing_keys([key]))
    }

    /// Read one key, refreshing the whole snapshot first if it is stale
    pub(super) async fn read(self: &Arc<Self>, key: &str) -> Result<String, CacheError> {
        if !self.is_stale() {
            counter!("config_cache_hits_total").increment(1);
            return self.value(key);
        }

        if let Err(error) = self.refresh().await {
            if self.policy == FallbackPolicy::FailHard || !self.has_items() {
                return Err(error);
            }

            counter!("config_cache_stale_served_total").increment(1);
            tracing::debug!(key, error = %error, "Serving stale value after failed refresh");
        }

        self.value(key)
    }

    /// Join the in-flight refresh, or start one if the snapshot is still stale
    async fn refresh(self: &Arc<Self>) -> Result<(), CacheError> {
        let flight = {
            let mut in_flight = self.in_flight();

            match in_flight.as_ref() {
                Some(flight) => {
                    tracing::debug!(keys = %self.keys, "Joining in-flight refresh");
                    Some(flight.clone())
                }
                // Another refresh may have finished between the caller's staleness check and now
                None if !self.is_stale() => None,
                None => {
                    // Runs as its own task so it completes even if every reader is dropped.
                    // The slot only holds the join handle, never the core.
                    let core = Arc::clone(self);
                    let task = tokio::spawn(async move {
                        let _guard = InFlightGuard(Arc::clone(&core));
                        core.run_refresh().await
                    });

                    let flight = async move {
                        task.await.unwrap_or_else(|e| {
                            Err(CacheError::source(
                                "cache",
                                format!("refresh task failed: {}", e),
                            ))
                        })
                    }
                    .boxed()
                    .shared();

                    *in_flight = Some(flight.clone());
                    Some(flight)
                }
            }
        };

        match flight {
            Some(flight) => flight.await,
            None => Ok(()),
        }
    }

    async fn run_refresh(&self) -> Result<(), CacheError> {
        tracing::info!(
            source = self.source.source_name(),
            keys = %self.keys,
            "Refreshing parameter store keys"
        );

        match self.fetch_complete().await {
            Ok(items) => {
                let expiration = expiration_after(self.clock.now(), self.expiry.as_duration());
                {
                    let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                    state.expiration = expiration;
                    state.items = items;
                }

                counter!("config_cache_refresh_total", "outcome" => "success").increment(1);
                tracing::info!(
                    source = self.source.source_name(),
                    keys = %self.keys,
                    expires_at = %expiration,
                    "Successfully refreshed parameter store keys"
                );

                self.notifier.emit_refresh();
                Ok(())
            }
            Err(error) => {
                counter!("config_cache_refresh_total", "outcome" => "failure").increment(1);

                if self.policy == FallbackPolicy::FailSoft && self.has_items() {
                    tracing::warn!(
                        source = self.source.source_name(),
                        keys = %self.keys,
                        error = %error,
                        "Refresh failed, keeping stale values"
                    );
                    self.notifier.emit_refresh_error(&error);
                } else {
                    tracing::error!(
                        source = self.source.source_name(),
                        keys = %self.keys,
                        error = %error,
                        "Refresh failed"
                    );
                }

                Err(error)
            }
        }
    }

    /// Fetch the full key set and reject responses that lack any key
    async fn fetch_complete(&self) -> Result<HashMap<String, String>, CacheError> {
        let params = self.source.fetch(self.keys.as_slice()).await?;

        let missing: Vec<&str> = self
            .keys
            .iter()
            .filter(|key| !params.contains_key(*key))
            .collect();

        if !missing.is_empty() {
            return Err(CacheError::missing_keys(missing));
        }

        Ok(params)
    }
}

impl std::fmt::Debug for CacheCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let refreshing = self.in_flight().is_some();
        let state = self.state();
        f.debug_struct("CacheCore")
            .field("source", &self.source.source_name())
            .field("keys", &self.keys)
            .field("expiry", &self.expiry)
            .field("policy", &self.policy)
            .field("expiration", &state.expiration)
            .field("cached", &state.items.len())
            .field("refreshing", &refreshing)
            .field("notifier", &self.notifier)
            .finish()
    }
}

/// Clears the refreshing state however the refresh task ends
struct InFlightGuard(Arc<CacheCore>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight().take();
    }
}

fn expiration_after(now: DateTime<Utc>, expiry: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(expiry)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Config accessor over a fixed key set, refreshed as a whole when stale
///
/// Cloning is cheap; clones share the same snapshot, refresh and listeners.
#[derive(Debug, Clone)]
pub struct ExpiringConfigCache {
    core: Arc<CacheCore>,
    views: Arc<HashMap<String, KeyView>>,
}

impl ExpiringConfigCache {
    /// Create a cache with the default clock and fail-soft policy
    ///
    /// Nothing is fetched until the first read.
    pub fn create<I, S>(
        source: Arc<dyn ParameterSource>,
        keys: I,
        expiry: Option<Duration>,
    ) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Self::builder(source, keys);
        if let Some(expiry) = expiry {
            builder = builder.expiry(expiry);
        }
        builder.build()
    }

    pub fn builder<I, S>(source: Arc<dyn ParameterSource>, keys: I) -> ExpiringConfigCacheBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExpiringConfigCacheBuilder::new(source, keys.into_iter().map(Into::into).collect())
    }

    /// Per-key accessor, if `name` is one of the configured keys
    pub fn key(&self, name: &str) -> Option<&KeyView> {
        self.views.get(name)
    }

    /// Per-key accessors in key set order
    pub fn keys(&self) -> impl Iterator<Item = &KeyView> {
        self.core
            .keys
            .iter()
            .filter_map(|name| self.views.get(name))
    }

    /// Read a key by name
    pub async fn get(&self, name: &str) -> Result<String, CacheError> {
        match self.key(name) {
            Some(view) => view.get().await,
            None => Err(CacheError::invalid_argument(format!(
                "unknown config key: {}",
                name
            ))),
        }
    }

    /// Read every key in order
    pub async fn values(&self) -> Result<HashMap<String, String>, CacheError> {
        let mut values = HashMap::with_capacity(self.core.keys.len());
        for view in self.keys() {
            values.insert(view.name().to_string(), view.get().await?);
        }
        Ok(values)
    }

    pub fn on_refresh<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.core.notifier.on_refresh(listener)
    }

    pub fn on_refresh_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CacheError) + Send + Sync + 'static,
    {
        self.core.notifier.on_refresh_error(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.core.notifier.remove_listener(id)
    }

    /// Stream of refresh outcomes
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.core.notifier.subscribe()
    }

    pub fn key_set(&self) -> &KeySet {
        &self.core.keys
    }

    pub fn expiry(&self) -> Expiry {
        self.core.expiry
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.core.policy
    }

    pub fn source_name(&self) -> &'static str {
        self.core.source.source_name()
    }

    /// Instant the current snapshot goes stale (Unix epoch before first refresh)
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.core.state().expiration
    }

    pub fn is_stale(&self) -> bool {
        self.core.is_stale()
    }

    pub fn is_refreshing(&self) -> bool {
        self.core.in_flight().is_some()
    }

    /// Copy of the cached values without triggering a refresh
    pub fn cached_values(&self) -> HashMap<String, String> {
        self.core.state().items.clone()
    }
}

enum ExpirySetting {
    Duration(Duration),
    Millis(i64),
}

/// Builder for [`ExpiringConfigCache`]
pub struct ExpiringConfigCacheBuilder {
    source: Arc<dyn ParameterSource>,
    keys: Vec<String>,
    expiry: Option<ExpirySetting>,
    policy: FallbackPolicy,
    clock: Arc<dyn Clock>,
}

impl ExpiringConfigCacheBuilder {
    fn new(source: Arc<dyn ParameterSource>, keys: Vec<String>) -> Self {
        Self {
            source,
            keys,
            expiry: None,
            policy: FallbackPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(ExpirySetting::Duration(expiry));
        self
    }

    pub fn expiry_ms(mut self, expiry_ms: i64) -> Self {
        self.expiry = Some(ExpirySetting::Millis(expiry_ms));
        self
    }

    pub fn policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<ExpiringConfigCache, CacheError> {
        let keys = KeySet::new(self.keys)?;
        let expiry = match self.expiry {
            None => Expiry::default(),
            Some(ExpirySetting::Duration(duration)) => Expiry::new(duration)?,
            Some(ExpirySetting::Millis(ms)) => Expiry::from_millis(ms)?,
        };

        let core = Arc::new(CacheCore {
            source: self.source,
            keys,
            expiry,
            policy: self.policy,
            clock: self.clock,
            state: RwLock::new(CacheState::empty()),
            in_flight: Mutex::new(None),
            notifier: RefreshNotifier::new(),
        });

        let views = core
            .keys
            .iter()
            .map(|name| (name.to_string(), KeyView::new(name, Arc::clone(&core))))
            .collect();

        tracing::debug!(
            source = core.source.source_name(),
            keys = %core.keys,
            expiry_ms = %core.expiry.as_millis(),
            policy = %core.policy,
            "Created expiring config cache"
        );

        Ok(ExpiringConfigCache {
            core,
            views: Arc::new(views),
        })
    }
}

impl std::fmt::Debug for ExpiringConfigCacheBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringConfigCacheBuilder")
            .field("source", &self.source.source_name())
            .field("keys", &self.keys)
            .field("policy", &self.policy)
            .finish()
    }
}
