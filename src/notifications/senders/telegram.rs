use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{NotificationSender, SenderError};
use crate::config::TelegramConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// A sender pushing alerts through the Telegram Bot API.
///
/// Messages go out as plain text via `sendMessage`; no parse mode, so alert
/// texts never need markup escaping.
pub struct TelegramSender {
    client: Client,
    api_base: String,
    access_token: String,
    channel_id: String,
}

impl TelegramSender {
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    /// Overrides the API host; tests point this at a local server.
    pub fn with_api_base(config: &TelegramConfig, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            access_token: config.access_token.clone(),
            channel_id: config.channel_id.clone(),
        }
    }
}

/// Response envelope of the Bot API. Errors come back as `ok: false` with no
/// `result`, usually still with HTTP 200.
#[derive(Debug, Deserialize)]
struct ApiAnswer {
    ok: bool,
    #[serde(default)]
    result: Option<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    message_id: i64,
}

#[async_trait]
impl NotificationSender for TelegramSender {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &str) -> Result<(), SenderError> {
        let url = format!(
            "{}/bot{}/sendMessage?chat_id={}&text={}",
            self.api_base,
            self.access_token,
            self.channel_id,
            urlencoding::encode(message),
        );

        let answer: ApiAnswer = self.client.get(&url).send().await?.json().await?;
        if !answer.ok {
            return Err(SenderError::SendFailed(
                "Telegram response is not OK".to_string(),
            ));
        }

        let message_id = answer.result.map(|r| r.message_id).unwrap_or_default();
        debug!(message_id, "Send telegram message success.");
        Ok(())
    }
}
