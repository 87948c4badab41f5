//! Toast side-channel for user-triggered operations.

use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Broadcasts toasts to every subscribed view.
///
/// Publishing with no subscribers drops the toast; that is not an error.
#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Toast>,
}

impl Notifier {
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the toast.
    pub fn notify(&self, level: ToastLevel, message: impl Into<String>) -> usize {
        let toast = Toast {
            level,
            message: message.into(),
        };
        self.sender.send(toast).unwrap_or(0)
    }

    pub fn success(&self, message: impl Into<String>) -> usize {
        self.notify(ToastLevel::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.notify(ToastLevel::Info, message)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.notify(ToastLevel::Error, message)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_toasts() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();

        assert_eq!(notifier.error("Failed to update counter"), 1);
        let toast = rx.recv().await.unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to update counter");
    }

    #[test]
    fn test_no_subscribers_is_not_an_error() {
        let notifier = Notifier::new(4);
        assert_eq!(notifier.success("Row added"), 0);
    }
}
