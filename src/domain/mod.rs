//! Domain layer - Cache inputs, events, errors and the parameter source contract

pub mod clock;
pub mod error;
pub mod event;
pub mod key_set;
pub mod policy;
pub mod source;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use error::CacheError;
pub use event::{ListenerId, RefreshEvent, RefreshEventKind};
pub use key_set::{Expiry, KeySet, DEFAULT_EXPIRY_MS};
pub use policy::FallbackPolicy;
pub use source::ParameterSource;

#[cfg(test)]
pub use source::{fake, MockParameterSource};
