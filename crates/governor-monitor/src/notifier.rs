//! Notification channels for governor events.

use async_trait::async_trait;
use governor_core::error::GovernorError;
use governor_core::traits::Notifier;
use governor_core::types::GovernorEvent;
use serde::Serialize;
use tracing::{info, warn};

/// Notifier that writes events to the structured log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &GovernorEvent) -> Result<(), GovernorError> {
        match event {
            GovernorEvent::Paused { .. } | GovernorEvent::Shutdown { .. } => {
                warn!(event = %event.describe(), "governor event")
            }
            _ => info!(event = %event.describe(), "governor event"),
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

/// Notifier that posts events to a Telegram chat via the Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, GovernorError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| GovernorError::Notify(e.to_string()))?;
        Ok(Self {
            client,
            bot_token,
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, event: &GovernorEvent) -> Result<(), GovernorError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: event.describe(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GovernorError::Notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GovernorError::Notify(format!(
                "telegram returned {status}"
            )));
        }
        Ok(())
    }
}
