//! Concrete [`ports::Sink`] adapter that posts alerts to a Telegram chat via
//! the Bot API's `sendMessage` method (§4.8).

use async_trait::async_trait;
use domain::Alert;
use ports::{SendResult, Sink};
use reqwest::Client;
use url::Url;

/// Wraps the Telegram Bot API, following the same thin
/// base-url-plus-client wrapper shape used elsewhere for outbound HTTP
/// collaborators.
pub struct TelegramSink {
    base: Url,
    client: Client,
}

impl TelegramSink {
    /// `bot_token` is the raw token (already resolved from `%ENV` indirection
    /// by the caller); this crate never reads environment variables itself.
    pub fn new(client: Client, bot_token: &str) -> Self {
        let base = format!("https://api.telegram.org/bot{bot_token}/")
            .parse()
            .expect("telegram api base url is well-formed");
        Self { base, client }
    }

    fn send_message_url(&self) -> Url {
        self.base
            .join("sendMessage")
            .expect("sendMessage is a valid relative path")
    }
}

#[async_trait]
impl Sink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, alert: &Alert) -> SendResult {
        let body = serde_json::json!({
            "chat_id": alert.chat_id,
            "text": alert.message,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let response = match self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return SendResult::failed(e.to_string()),
        };

        if response.status().is_success() {
            SendResult::delivered()
        } else {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            SendResult::failed(format!("telegram returned {status}: {detail}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_url_is_relative_to_the_bot_token_base() {
        let sink = TelegramSink::new(Client::new(), "123:ABC");
        assert_eq!(
            sink.send_message_url().as_str(),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
    }

    #[test]
    fn sink_name_identifies_telegram() {
        let sink = TelegramSink::new(Client::new(), "tok");
        assert_eq!(sink.name(), "telegram");
    }
}
