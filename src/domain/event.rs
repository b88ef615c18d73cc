use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::CacheError;

/// Outcome of a refresh, as seen by observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// The cache was repopulated from the source
    Refreshed,
    /// A refresh failed and stale values were kept in its place
    RefreshFailed(CacheError),
}

impl RefreshEvent {
    pub fn kind(&self) -> RefreshEventKind {
        match self {
            Self::Refreshed => RefreshEventKind::Refresh,
            Self::RefreshFailed(_) => RefreshEventKind::RefreshError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshEventKind {
    Refresh,
    RefreshError,
}

impl std::fmt::Display for RefreshEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshEventKind::Refresh => write!(f, "refresh"),
            RefreshEventKind::RefreshError => write!(f, "refreshError"),
        }
    }
}

/// Registration handle returned when a listener is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}
