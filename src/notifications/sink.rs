//! The alert consumer. A single task drains the alert channel so delivery
//! order matches emission order, logs every alert, and fans each one out to
//! the configured backends.

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::NotifyConfig;
use crate::monitor::Alert;

use super::senders::telegram::TelegramSender;
use super::senders::NotificationSender;

pub struct AlertSink {
    senders: Vec<Box<dyn NotificationSender>>,
}

impl AlertSink {
    /// Builds the sink from the notify configuration. Backends without
    /// credentials are left out; with no backends the sink still drains the
    /// channel and logs.
    pub fn from_config(notify: &NotifyConfig) -> Self {
        let mut senders: Vec<Box<dyn NotificationSender>> = Vec::new();
        if let Some(telegram) = &notify.telegram {
            if telegram.access_token.is_empty() {
                debug!("Telegram access token is empty; telegram notifications disabled.");
            } else {
                info!("Telegram notifications enabled.");
                senders.push(Box::new(TelegramSender::new(telegram)));
            }
        }
        Self { senders }
    }

    pub fn with_senders(senders: Vec<Box<dyn NotificationSender>>) -> Self {
        Self { senders }
    }

    /// Names of the active backends, in delivery order.
    pub fn sender_names(&self) -> Vec<&'static str> {
        self.senders.iter().map(|s| s.name()).collect()
    }

    /// Consumes alerts until every producer handle is dropped. A failed
    /// delivery is logged and dropped; it never feeds back into monitor
    /// state and never stops the loop.
    pub async fn run(self, mut rx: mpsc::Receiver<Alert>) {
        while let Some(alert) = rx.recv().await {
            info!(
                entity_id = alert.entity_id,
                raised_at = %alert.raised_at,
                "Send alert => {}",
                alert.text
            );
            for sender in &self.senders {
                match sender.send(&alert.text).await {
                    Ok(()) => debug!(sender = sender.name(), "Alert delivered."),
                    Err(e) => {
                        error!(sender = sender.name(), error = %e, "Failed to deliver alert.")
                    }
                }
            }
        }
        debug!("Alert channel closed; sink finished.");
    }
}
