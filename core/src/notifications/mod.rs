//! User-visible notifications
//!
//! The supervisor reports mount outcomes through a [`NotificationSink`];
//! delivery to the toast/session surface is an external concern. The
//! in-process [`Notifier`] keeps history and fans out to subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
	pub id: Uuid,
	pub title: String,
	pub message: String,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4(),
			title: title.into(),
			message: message.into(),
			created_at: Utc::now(),
		}
	}
}

/// Consumer of session-scoped notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
	async fn send_notification(&self, session_id: u32, notification: Notification);
}

/// In-process sink retaining history and broadcasting to subscribers.
pub struct Notifier {
	notifications: Mutex<Vec<(u32, Notification)>>,
	chan: broadcast::Sender<Notification>,
}

impl Notifier {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			notifications: Mutex::new(Vec::new()),
			chan: broadcast::channel(15).0,
		})
	}

	pub async fn get_notifications(&self) -> Vec<(u32, Notification)> {
		self.notifications.lock().await.clone()
	}

	pub async fn clear_notifications(&self) {
		self.notifications.lock().await.clear();
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
		self.chan.subscribe()
	}
}

#[async_trait]
impl NotificationSink for Notifier {
	async fn send_notification(&self, session_id: u32, notification: Notification) {
		self.notifications
			.lock()
			.await
			.push((session_id, notification.clone()));
		if self.chan.receiver_count() > 0 {
			self.chan.send(notification).ok();
		}
	}
}
