//! Transient "XP earned" notifications
//!
//! The current notification lives in a `watch` channel so a view can render
//! whatever is latest. Each notification is dismissed after a fixed delay; a
//! newer one replaces it and restarts the delay.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpNotification {
    pub article_id: String,
    pub read_percentage: u8,
    /// Awarded by this report
    pub xp_earned: u32,
    /// Running total for the session
    pub total_xp: u64,
}

#[derive(Debug)]
pub struct XpNotifier {
    current: Arc<watch::Sender<Option<XpNotification>>>,
    display_for: Duration,
    dismiss: Mutex<Option<JoinHandle<()>>>,
}

impl XpNotifier {
    pub fn new(display_for: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            display_for,
            dismiss: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<XpNotification>> {
        self.current.subscribe()
    }

    pub fn current(&self) -> Option<XpNotification> {
        self.current.borrow().clone()
    }

    /// Publishes a notification and schedules its dismissal. Must be called
    /// from within a tokio runtime.
    pub fn notify(&self, notification: XpNotification) {
        let mut dismiss = self.dismiss.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = dismiss.take() {
            previous.abort();
        }

        self.current.send_replace(Some(notification));

        let current = Arc::clone(&self.current);
        let display_for = self.display_for;
        *dismiss = Some(tokio::spawn(async move {
            tokio::time::sleep(display_for).await;
            current.send_replace(None);
        }));
    }

    pub fn dismiss(&self) {
        if let Some(pending) = self
            .dismiss
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
        self.current.send_replace(None);
    }
}

impl Drop for XpNotifier {
    fn drop(&mut self) {
        let pending = match self.dismiss.get_mut() {
            Ok(pending) => pending.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(pending) = pending {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(xp: u32) -> XpNotification {
        XpNotification {
            article_id: "a".to_string(),
            read_percentage: 50,
            xp_earned: xp,
            total_xp: u64::from(xp),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismissed_after_delay() {
        let notifier = XpNotifier::new(Duration::from_secs(3));
        notifier.notify(notification(10));
        assert_eq!(notifier.current(), Some(notification(10)));

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_notification_restarts_delay() {
        let notifier = XpNotifier::new(Duration::from_secs(3));
        notifier.notify(notification(10));
        tokio::time::sleep(Duration::from_secs(2)).await;

        notifier.notify(notification(20));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(notifier.current(), Some(notification(20)));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let notifier = XpNotifier::new(Duration::from_secs(3));
        let mut rx = notifier.subscribe();

        notifier.notify(notification(5));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(notification(5)));

        notifier.dismiss();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }
}
