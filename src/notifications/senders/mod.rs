use async_trait::async_trait;
use thiserror::Error;

pub mod telegram;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A delivery backend for rendered alert messages. Concrete senders carry
/// their own credentials; delivery takes nothing but the finished text.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Backend name, used in delivery logs.
    fn name(&self) -> &'static str;

    /// Sends one alert message.
    async fn send(&self, message: &str) -> Result<(), SenderError>;
}
