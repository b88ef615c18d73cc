//! Validated construction inputs: the key set and the expiry duration

use std::time::Duration;

use crate::domain::CacheError;

/// Default time a successful refresh stays fresh (3 minutes)
pub const DEFAULT_EXPIRY_MS: u64 = 180_000;

/// Ordered, non-empty set of parameter names fixed for the life of a cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet(Vec<String>);

impl KeySet {
    /// Create a key set, rejecting an empty sequence
    pub fn new<I, S>(keys: I) -> Result<Self, CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        validate_keys(&keys)?;
        Ok(Self(keys))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A key set is never empty once constructed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }
}

impl TryFrom<Vec<String>> for KeySet {
    type Error = CacheError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

fn validate_keys(keys: &[String]) -> Result<(), CacheError> {
    if keys.is_empty() {
        return Err(CacheError::invalid_argument(
            "non-empty array of config keys required",
        ));
    }

    Ok(())
}

/// Positive duration shared by every key of one cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry(Duration);

impl Expiry {
    pub fn new(duration: Duration) -> Result<Self, CacheError> {
        if duration.is_zero() {
            return Err(expiry_error());
        }

        Ok(Self(duration))
    }

    /// Build from a signed millisecond count, as read from configuration
    pub fn from_millis(ms: i64) -> Result<Self, CacheError> {
        if ms <= 0 {
            return Err(expiry_error());
        }

        Ok(Self(Duration::from_millis(ms as u64)))
    }

    /// Resolve an optional expiry, falling back to the 180000 ms default
    pub fn or_default(duration: Option<Duration>) -> Result<Self, CacheError> {
        match duration {
            Some(duration) => Self::new(duration),
            None => Ok(Self::default()),
        }
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_EXPIRY_MS))
    }
}

fn expiry_error() -> CacheError {
    CacheError::invalid_argument("expiry must be greater than zero, or omitted")
}
