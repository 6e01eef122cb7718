//! User-facing notifications for failed and completed operations.
//!
//! Every surfaced failure becomes one discrete notification naming the
//! operation it came from. Notifications stay until dismissed, unless the
//! center was given a lifetime, in which case `prune_expired` drops old ones.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::CaptureId;

/// Identifier of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// The operation a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Load,
    Capture,
    Extract(CaptureId),
    Export,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Load => write!(f, "Load"),
            Operation::Capture => write!(f, "Capture"),
            Operation::Extract(id) => write!(f, "Extract capture {}", id),
            Operation::Export => write!(f, "Export"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub operation: Operation,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Whether the notification is older than `lifetime` at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        now - self.created_at >= lifetime
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

/// Ordered list of live notifications, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    next_id: u64,
    lifetime: Option<Duration>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications older than `lifetime` are dropped by [`prune_expired`](Self::prune_expired).
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            lifetime: Some(lifetime),
            ..Self::default()
        }
    }

    pub fn notify(
        &mut self,
        operation: Operation,
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.notifications.push(Notification {
            id,
            operation,
            level,
            message: message.into(),
            created_at: Utc::now(),
        });
        id
    }

    pub fn info(&mut self, operation: Operation, message: impl Into<String>) -> NotificationId {
        self.notify(operation, NotificationLevel::Info, message)
    }

    pub fn warn(&mut self, operation: Operation, message: impl Into<String>) -> NotificationId {
        self.notify(operation, NotificationLevel::Warning, message)
    }

    pub fn error(&mut self, operation: Operation, message: impl Into<String>) -> NotificationId {
        self.notify(operation, NotificationLevel::Error, message)
    }

    /// Remove one notification. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    /// Remove expired notifications, returns true if any were removed
    pub fn prune_expired(&mut self) -> bool {
        self.prune_expired_at(Utc::now())
    }

    pub fn prune_expired_at(&mut self, now: DateTime<Utc>) -> bool {
        let Some(lifetime) = self.lifetime else {
            return false;
        };
        let initial_len = self.notifications.len();
        self.notifications
            .retain(|n| !n.is_expired_at(now, lifetime));
        self.notifications.len() != initial_len
    }

    /// Most recent notification.
    pub fn latest(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }

    /// Notifications reporting on one operation.
    pub fn for_operation(&self, operation: Operation) -> impl Iterator<Item = &Notification> + '_ {
        self.notifications
            .iter()
            .filter(move |n| n.operation == operation)
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_and_dismiss() {
        let mut center = NotificationCenter::new();
        let a = center.error(Operation::Capture, "Please select at least one area");
        let b = center.info(Operation::Load, "Loaded 3 pages");

        assert_eq!(center.len(), 2);
        assert_eq!(center.latest().unwrap().id, b);

        assert!(center.dismiss(a));
        assert!(!center.dismiss(a));
        assert_eq!(center.all()[0].operation, Operation::Load);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut center = NotificationCenter::new();
        let a = center.warn(Operation::Export, "x");
        center.clear();
        let b = center.warn(Operation::Export, "x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_for_operation() {
        let mut center = NotificationCenter::new();
        center.error(Operation::Extract(CaptureId(1)), "timeout");
        center.error(Operation::Extract(CaptureId(2)), "no tables");
        center.error(Operation::Extract(CaptureId(1)), "timeout");

        assert_eq!(center.for_operation(Operation::Extract(CaptureId(1))).count(), 2);
        assert_eq!(center.for_operation(Operation::Load).count(), 0);
    }

    #[test]
    fn test_display_names_operation() {
        let mut center = NotificationCenter::new();
        center.error(Operation::Extract(CaptureId(4)), "No tables found in the image");
        assert_eq!(
            center.latest().unwrap().to_string(),
            "Extract capture 4: No tables found in the image"
        );
    }

    // ==================== Expiry Tests ====================

    #[test]
    fn test_no_lifetime_never_prunes() {
        let mut center = NotificationCenter::new();
        center.info(Operation::Load, "ok");
        assert!(!center.prune_expired_at(Utc::now() + Duration::days(365)));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_prune_expired() {
        let mut center = NotificationCenter::with_lifetime(Duration::seconds(5));
        center.info(Operation::Load, "ok");
        let created = center.latest().unwrap().created_at;

        assert!(!center.prune_expired_at(created + Duration::seconds(4)));
        assert!(center.prune_expired_at(created + Duration::seconds(5)));
        assert!(center.is_empty());
    }
}
