//! Refresh event notifier
//!
//! Two typed listener channels (`refresh`, `refreshError`) plus a broadcast
//! stream of [`RefreshEvent`] for async consumers.

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::domain::{CacheError, ListenerId, RefreshEvent};

/// Default capacity of the event broadcast channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

type RefreshListener = Arc<dyn Fn() + Send + Sync>;
type RefreshErrorListener = Arc<dyn Fn(&CacheError) + Send + Sync>;

pub struct RefreshNotifier {
    refresh: RwLock<Vec<(ListenerId, RefreshListener)>>,
    refresh_error: RwLock<Vec<(ListenerId, RefreshErrorListener)>>,
    tx: broadcast::Sender<RefreshEvent>,
}

impl RefreshNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self {
            refresh: RwLock::new(Vec::new()),
            refresh_error: RwLock::new(Vec::new()),
            tx,
        }
    }

    pub fn on_refresh<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        self.refresh
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    pub fn on_refresh_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CacheError) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        self.refresh_error
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener from whichever channel it was registered on
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut refresh = self.refresh.write().unwrap_or_else(|e| e.into_inner());
        let before = refresh.len();
        refresh.retain(|(listener_id, _)| *listener_id != id);
        if refresh.len() != before {
            return true;
        }
        drop(refresh);

        let mut refresh_error = self
            .refresh_error
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let before = refresh_error.len();
        refresh_error.retain(|(listener_id, _)| *listener_id != id);
        refresh_error.len() != before
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.refresh.read().unwrap_or_else(|e| e.into_inner()).len()
            + self
                .refresh_error
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .len()
    }

    pub(crate) fn emit_refresh(&self) {
        // Snapshot so listeners may register further listeners without deadlocking
        let listeners: Vec<RefreshListener> = self
            .refresh
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }

        let _ = self.tx.send(RefreshEvent::Refreshed);
    }

    pub(crate) fn emit_refresh_error(&self, error: &CacheError) {
        let listeners: Vec<RefreshErrorListener> = self
            .refresh_error
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(error);
        }

        let _ = self.tx.send(RefreshEvent::RefreshFailed(error.clone()));
    }
}

impl Default for RefreshNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RefreshNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshNotifier")
            .field("listeners", &self.listener_count())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_refresh_listeners_invoked_in_order() {
        let notifier = RefreshNotifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        notifier.on_refresh(move || first.lock().unwrap().push(1));
        let second = Arc::clone(&order);
        notifier.on_refresh(move || second.lock().unwrap().push(2));

        notifier.emit_refresh();

        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_error_listener_receives_error() {
        let notifier = RefreshNotifier::new();
        let seen = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&seen);
        notifier.on_refresh_error(move |err| *sink.lock().unwrap() = Some(err.clone()));

        let error = CacheError::source("ssm", "AccessDenied");
        notifier.emit_refresh_error(&error);

        assert_eq!(*seen.lock().unwrap(), Some(error));
    }

    #[test]
    fn test_channels_are_independent() {
        let notifier = RefreshNotifier::new();
        let refreshes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let r = Arc::clone(&refreshes);
        notifier.on_refresh(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        let e = Arc::clone(&errors);
        notifier.on_refresh_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        notifier.emit_refresh();
        notifier.emit_refresh();
        notifier.emit_refresh_error(&CacheError::missing_keys(["foo"]));

        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener() {
        let notifier = RefreshNotifier::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        let id = notifier.on_refresh(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let error_id = notifier.on_refresh_error(|_| {});
        assert_eq!(notifier.listener_count(), 2);

        assert!(notifier.remove_listener(id));
        assert!(!notifier.remove_listener(id));
        assert!(notifier.remove_listener(error_id));

        notifier.emit_refresh();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_register_another_listener() {
        let notifier = Arc::new(RefreshNotifier::new());

        let inner = Arc::clone(&notifier);
        notifier.on_refresh(move || {
            inner.on_refresh(|| {});
        });

        notifier.emit_refresh();
        assert_eq!(notifier.listener_count(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_receive_tagged_events() {
        let notifier = RefreshNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.emit_refresh();
        notifier.emit_refresh_error(&CacheError::source("ssm", "timeout"));

        assert_eq!(rx.recv().await.unwrap(), RefreshEvent::Refreshed);
        assert_eq!(
            rx.recv().await.unwrap(),
            RefreshEvent::RefreshFailed(CacheError::source("ssm", "timeout"))
        );
    }
}
