//! Blocking-style loading indicator shown while a submission is outstanding.
//!
//! [`LoadingIndicator::show`] hands out a [`LoadingGuard`]; the indicator hides when the
//! last guard drops, so every exit path of a submission (success, refusal, transport
//! error, early return via `?`, cancelled future) dismisses it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

use crate::types::Event;

/// Reference-counted visibility flag (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct LoadingIndicator {
    holders: Arc<AtomicUsize>,
    event_tx: broadcast::Sender<Event>,
}

impl LoadingIndicator {
    /// Create a hidden indicator
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            holders: Arc::new(AtomicUsize::new(0)),
            event_tx,
        }
    }

    /// Show the indicator until the returned guard is dropped
    #[must_use = "the indicator hides as soon as the guard is dropped"]
    pub fn show(&self) -> LoadingGuard {
        if self.holders.fetch_add(1, Ordering::SeqCst) == 0 {
            self.event_tx.send(Event::Loading { visible: true }).ok();
        }
        LoadingGuard {
            indicator: self.clone(),
            released: false,
        }
    }

    /// Hide the indicator immediately, regardless of outstanding guards
    ///
    /// Guards dropped afterwards do not show it again.
    pub fn dismiss(&self) {
        if self.holders.swap(0, Ordering::SeqCst) > 0 {
            self.event_tx.send(Event::Loading { visible: false }).ok();
        }
    }

    /// Whether the indicator is currently shown
    pub fn is_visible(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }

    fn release(&self) {
        let previous = self
            .holders
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.event_tx.send(Event::Loading { visible: false }).ok();
        }
    }
}

/// Keeps the loading indicator visible while alive
pub struct LoadingGuard {
    indicator: LoadingIndicator,
    released: bool,
}

impl LoadingGuard {
    /// Hide now instead of at end of scope
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.indicator.release();
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn indicator() -> (LoadingIndicator, broadcast::Receiver<Event>) {
        let (tx, rx) = broadcast::channel(16);
        (LoadingIndicator::new(tx), rx)
    }

    #[test]
    fn test_guard_drop_hides() {
        let (loading, _rx) = indicator();
        {
            let _guard = loading.show();
            assert!(loading.is_visible());
        }
        assert!(!loading.is_visible());
    }

    #[test]
    fn test_hidden_on_error_path() {
        fn failing(loading: &LoadingIndicator) -> Result<(), &'static str> {
            let _guard = loading.show();
            Err::<(), _>("boom")?;
            Ok(())
        }

        let (loading, _rx) = indicator();
        assert!(failing(&loading).is_err());
        assert!(!loading.is_visible());
    }

    #[test]
    fn test_nested_guards() {
        let (loading, _rx) = indicator();
        let outer = loading.show();
        let inner = loading.show();
        inner.release();
        assert!(loading.is_visible());
        drop(outer);
        assert!(!loading.is_visible());
    }

    #[test]
    fn test_dismiss_overrides_guards() {
        let (loading, mut rx) = indicator();
        let guard = loading.show();
        loading.dismiss();
        assert!(!loading.is_visible());
        drop(guard);
        assert!(!loading.is_visible());

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let visibility: Vec<bool> = events
            .into_iter()
            .filter_map(|e| match e {
                Event::Loading { visible } => Some(visible),
                _ => None,
            })
            .collect();
        assert_eq!(visibility, vec![true, false]);
    }

    #[tokio::test]
    async fn test_hidden_when_future_is_cancelled() {
        let (loading, _rx) = indicator();
        let handle = {
            let loading = loading.clone();
            tokio::spawn(async move {
                let _guard = loading.show();
                std::future::pending::<()>().await;
            })
        };
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(loading.is_visible());

        handle.abort();
        let _ = handle.await;
        assert!(!loading.is_visible());
    }
}
