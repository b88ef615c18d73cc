//! Parameter Store Cache
//!
//! An expiring, self-refreshing cache over a remote key-value parameter store:
//! - One snapshot of a fixed key set, refreshed as a whole when stale
//! - Concurrent stale reads share a single in-flight refresh
//! - Stale values are served when a refresh fails (fail-soft), with
//!   `refreshError` notifications
//! - SSM Parameter Store in production, process environment elsewhere
//!
//! ```ignore
//! use std::sync::Arc;
//! use paramstore_cache::{ExpiringConfigCache, EnvParameterSource};
//!
//! let cache = ExpiringConfigCache::create(
//!     Arc::new(EnvParameterSource::new()),
//!     ["DATABASE_URL", "API_TOKEN"],
//!     None,
//! )?;
//! cache.on_refresh(|| tracing::info!("config refreshed"));
//!
//! let url = cache.get("DATABASE_URL").await?;
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CacheError, Clock, Expiry, FallbackPolicy, KeySet, ListenerId, ParameterSource,
    RefreshEvent, RefreshEventKind, SystemClock, DEFAULT_EXPIRY_MS,
};
#[cfg(feature = "test-util")]
pub use domain::ManualClock;
pub use infrastructure::cache::{
    batch_read, ExpiringConfigCache, ExpiringConfigCacheBuilder, KeyView, RefreshNotifier,
};
pub use infrastructure::source::{
    DeploymentContext, EnvParameterSource, SourceConfig, SourceFactory, SsmParameterSource,
};
