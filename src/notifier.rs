//! Transient user-facing notifications.
//!
//! Every notification removes itself once its lifetime ends, whatever its kind.
//! Several may be visible at once; they are kept in posting order.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

use crate::config::NotificationConfig;
use crate::types::{Event, Notification, NotificationId, NotificationKind};

/// Queue of visible notifications (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct Notifier {
    visible: Arc<Mutex<Vec<Notification>>>,
    next_id: Arc<AtomicU64>,
    config: NotificationConfig,
    event_tx: broadcast::Sender<Event>,
}

impl Notifier {
    /// Create a notifier publishing on the given event channel
    pub fn new(config: NotificationConfig, event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            visible: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            config,
            event_tx,
        }
    }

    /// Post a notification and schedule its removal
    ///
    /// Must be called within a tokio runtime.
    pub fn notify(&self, text: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let notification = Notification {
            id: NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            text: text.into(),
            kind,
            created_at: Utc::now(),
        };
        let id = notification.id;

        match kind {
            NotificationKind::Success => tracing::info!(id = %id, text = %notification.text, "notification"),
            NotificationKind::Error => tracing::warn!(id = %id, text = %notification.text, "error notification"),
        }

        let evicted = {
            let mut visible = self.lock();
            visible.push(notification.clone());
            let overflow = visible.len().saturating_sub(self.config.max_visible);
            visible.drain(..overflow).map(|n| n.id).collect::<Vec<_>>()
        };

        self.event_tx.send(Event::Notified { notification }).ok();
        for evicted_id in evicted {
            self.event_tx
                .send(Event::NotificationDismissed { id: evicted_id })
                .ok();
        }

        let this = self.clone();
        let lifetime = self.config.lifetime;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            this.dismiss(id);
        });

        id
    }

    /// Post a success notification
    pub fn success(&self, text: impl Into<String>) -> NotificationId {
        self.notify(text, NotificationKind::Success)
    }

    /// Post an error notification
    pub fn error(&self, text: impl Into<String>) -> NotificationId {
        self.notify(text, NotificationKind::Error)
    }

    /// Remove a notification before its lifetime ends
    ///
    /// Returns false if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let removed = {
            let mut visible = self.lock();
            let before = visible.len();
            visible.retain(|n| n.id != id);
            visible.len() != before
        };

        if removed {
            self.event_tx.send(Event::NotificationDismissed { id }).ok();
        }
        removed
    }

    /// Currently visible notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    // A panic while holding the lock cannot leave the Vec half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.visible
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
