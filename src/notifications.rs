//! Per-view queue of transient toast messages

use std::time::{Duration, Instant};

use crate::models::Notification;

/// How long a toast stays on screen
pub const DISPLAY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Stable handle for a queued notification.
/// Removal goes through ids so that an auto-dismiss and a manual close landing
/// in the same frame can never remove each other's entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub id: NotificationId,
    pub notification: Notification,
    pub shown_at: Instant,
}

#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: Vec<QueuedNotification>,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, notification: Notification) -> NotificationId {
        self.enqueue_at(notification, Instant::now())
    }

    pub fn enqueue_at(&mut self, notification: Notification, shown_at: Instant) -> NotificationId {
        let id = NotificationId(self.next_id);
        self.next_id += 1;
        self.entries.push(QueuedNotification { id, notification, shown_at });
        id
    }

    pub fn error(&mut self, body: &str) -> NotificationId {
        self.enqueue(Notification::error(body))
    }

    pub fn success(&mut self, body: &str) -> NotificationId {
        self.enqueue(Notification::success(body))
    }

    #[cfg(test)]
    pub fn info(&mut self, body: &str) -> NotificationId {
        self.enqueue(Notification::info(body))
    }

    /// Remove by id; false when it was already gone
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Remove whatever currently sits at `index`
    #[cfg(test)]
    pub fn dismiss_at(&mut self, index: usize) -> Option<Notification> {
        if index < self.entries.len() {
            Some(self.entries.remove(index).notification)
        } else {
            None
        }
    }

    /// Drop every entry that has been visible for the full display timeout
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| now.saturating_duration_since(e.shown_at) < DISPLAY_TIMEOUT);
        before - self.entries.len()
    }

    /// Time until the next entry expires
    pub fn next_expiry(&self, now: Instant) -> Option<Duration> {
        self.entries
            .iter()
            .map(|e| DISPLAY_TIMEOUT.saturating_sub(now.saturating_duration_since(e.shown_at)))
            .min()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedNotification> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn bodies(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.notification.body.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    #[test]
    fn test_enqueue_preserves_order() {
        let mut queue = NotificationQueue::new();
        queue.error("first");
        queue.success("second");
        queue.info("third");
        assert_eq!(queue.bodies(), vec!["first", "second", "third"]);
        let kinds: Vec<_> = queue.iter().map(|e| e.notification.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::Error, NotificationKind::Success, NotificationKind::Info]
        );
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut queue = NotificationQueue::new();
        let a = queue.info("a");
        let b = queue.info("b");
        queue.dismiss(a);
        let c = queue.info("c");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_dismiss_at_zero_shifts_second() {
        let mut queue = NotificationQueue::new();
        queue.error("one");
        queue.success("two");
        let removed = queue.dismiss_at(0).unwrap();
        assert_eq!(removed.body, "one");
        assert_eq!(queue.bodies(), vec!["two"]);
        assert!(queue.dismiss_at(5).is_none());
    }

    #[test]
    fn test_dismiss_by_id_after_other_removal() {
        let mut queue = NotificationQueue::new();
        let first = queue.error("one");
        let second = queue.error("two");
        let third = queue.error("three");

        // Both were rendered at positions 0 and 2; removing by id stays correct
        assert!(queue.dismiss(first));
        assert!(queue.dismiss(third));
        assert_eq!(queue.bodies(), vec!["two"]);

        assert!(!queue.dismiss(first));
        assert!(queue.dismiss(second));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_expire_after_timeout() {
        let mut queue = NotificationQueue::new();
        let start = Instant::now();
        queue.enqueue_at(Notification::error("old"), start);
        queue.enqueue_at(Notification::success("new"), start + Duration::from_millis(3000));

        assert_eq!(queue.expire(start + Duration::from_millis(4999)), 0);
        assert_eq!(
            queue.next_expiry(start + Duration::from_millis(4000)),
            Some(Duration::from_millis(1000))
        );

        assert_eq!(queue.expire(start + DISPLAY_TIMEOUT), 1);
        assert_eq!(queue.bodies(), vec!["new"]);

        assert_eq!(queue.expire(start + Duration::from_millis(8000)), 1);
        assert!(queue.is_empty());
        assert_eq!(queue.next_expiry(start), None);
    }
}
