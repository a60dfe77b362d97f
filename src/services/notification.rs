use std::collections::HashSet;

use tracing::debug;

use crate::types::{Achievement, Notification, NotificationType};

pub const ACHIEVEMENT_TITLE: &str = "Achievement Unlocked!";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification not found: {0}")]
    NotFound(String),
}

/// Append-only notification list. The read flag is the only mutable field.
#[derive(Debug, Clone, Default)]
pub struct NotificationEmitter {
    items: Vec<Notification>,
}

impl NotificationEmitter {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.read)
    }

    pub fn read(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| n.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }

    pub fn add_notification(&mut self, notification: Notification) -> &Notification {
        debug!(
            notification_id = %notification.id,
            kind = ?notification.notification_type,
            "notification added"
        );
        self.items.push(notification);
        &self.items[self.items.len() - 1]
    }

    pub fn achievement_unlocked(&mut self, user_id: &str, achievement: &Achievement) -> &Notification {
        self.add_notification(Notification::new(
            user_id,
            NotificationType::Achievement,
            ACHIEVEMENT_TITLE,
            format!("You earned the '{}' achievement!", achievement.title),
        ))
    }

    /// Returns whether the flag actually changed.
    pub fn mark_as_read(&mut self, notification_id: &str) -> Result<bool, NotificationError> {
        let item = self
            .items
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| NotificationError::NotFound(notification_id.to_string()))?;

        let changed = !item.read;
        item.read = true;
        Ok(changed)
    }

    pub fn mark_all_read(&mut self) -> Vec<String> {
        self.items
            .iter_mut()
            .filter(|n| !n.read)
            .map(|n| {
                n.read = true;
                n.id.clone()
            })
            .collect()
    }

    /// Appends records not already present by id. A remote read flag never clears a local one.
    pub fn merge(&mut self, incoming: Vec<Notification>) -> usize {
        let mut added = 0;
        for notification in incoming {
            match self.items.iter_mut().find(|n| n.id == notification.id) {
                Some(existing) => existing.read |= notification.read,
                None => {
                    self.items.push(notification);
                    added += 1;
                }
            }
        }
        added
    }

    pub fn restore(&mut self, items: Vec<Notification>) {
        let mut seen = HashSet::new();
        self.items = items.into_iter().filter(|n| seen.insert(n.id.clone())).collect();
    }
}
