use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// A transient, user-visible message.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn info(title: &str, description: &str) -> Self {
        Self::build(title, description, Variant::Default)
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self::build(title, description, Variant::Destructive)
    }

    fn build(title: &str, description: &str, variant: Variant) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant,
            created_at: Utc::now(),
        }
    }
}

/// Sending half of the notification stream.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, notification: Notification) {
        // Nobody listening is fine: the UI may already be gone.
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped, receiver closed");
        }
    }
}
