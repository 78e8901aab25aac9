//! In-memory notification records

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification addressed to a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: String,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    notifications: Vec<Notification>,
}

/// Notifications kept for the process lifetime
#[derive(Debug, Default)]
pub struct NotificationStore {
    inner: RwLock<Inner>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new: NewNotification) -> Notification {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.last_id += 1;

        let notification = Notification {
            id: inner.last_id,
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        inner.notifications.push(notification.clone());
        notification
    }

    /// All notifications, newest first
    pub fn list(&self) -> Vec<Notification> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.notifications.iter().rev().cloned().collect()
    }

    /// Mark one notification read; `None` if it does not exist
    pub fn mark_read(&self, id: i64) -> Option<Notification> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let notification = inner.notifications.iter_mut().find(|n| n.id == id)?;
        notification.read = true;
        Some(notification.clone())
    }

    /// Mark everything read, returning how many changed
    pub fn mark_all_read(&self) -> usize {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut changed = 0;
        for notification in inner.notifications.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new(title: &str) -> NewNotification {
        NewNotification {
            user_id: 1,
            title: title.into(),
            message: "m".into(),
            kind: "info".into(),
        }
    }

    #[test]
    fn test_create_and_list_newest_first() {
        let store = NotificationStore::new();
        store.create(new("first"));
        store.create(new("second"));

        let titles: Vec<_> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_mark_read() {
        let store = NotificationStore::new();
        let n = store.create(new("x"));

        assert!(store.mark_read(n.id).unwrap().read);
        assert!(store.mark_read(999).is_none());
    }

    #[test]
    fn test_mark_all_read_counts_changes() {
        let store = NotificationStore::new();
        let a = store.create(new("a"));
        store.create(new("b"));
        store.mark_read(a.id);

        assert_eq!(store.mark_all_read(), 1);
        assert_eq!(store.mark_all_read(), 0);
        assert!(store.list().iter().all(|n| n.read));
    }

    #[test]
    fn test_type_field_name() {
        let store = NotificationStore::new();
        let value = serde_json::to_value(store.create(new("x"))).unwrap();
        assert_eq!(value["type"], "info");
        assert_eq!(value["read"], false);
    }
}
