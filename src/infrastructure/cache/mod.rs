//! Expiring config cache - refresh coordination, key views and refresh events

mod batch;
mod expiring;
mod key_view;
mod notifier;

pub use batch::batch_read;
pub use expiring::{ExpiringConfigCache, ExpiringConfigCacheBuilder};
pub use key_view::KeyView;
pub use notifier::RefreshNotifier;
