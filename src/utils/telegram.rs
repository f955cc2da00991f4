// src/utils/telegram.rs

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::{Config, MAX_MESSAGE_LEN},
    utils::chunk::{split_message, text_units},
};

/// Why a report (or one of its chunks) could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Network failure, timeout, or an unreadable reply.
    Transport(String),
    /// The Bot API answered `ok: false`.
    Rejected(String),
    /// `TELEGRAM_API_BASE` cannot be turned into a request URL.
    InvalidEndpoint(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Transport(msg) => write!(f, "Telegram request failed: {}", msg),
            DeliveryError::Rejected(description) => write!(f, "Telegram error: {}", description),
            DeliveryError::InvalidEndpoint(msg) => write!(f, "Invalid Telegram endpoint: {}", msg),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// A destination that accepts one text message per call.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Deserialize)]
struct BotApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API `sendMessage` client bound to one bot and one chat.
pub struct TelegramClient {
    client: reqwest::Client,
    /// `{base}/bot{token}/sendMessage`. Contains the token; never log it.
    endpoint: Url,
    chat_id: String,
    parse_mode: Option<&'static str>,
}

impl TelegramClient {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        chat_id: &str,
        parse_mode: Option<&'static str>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let mut endpoint =
            Url::parse(api_base).map_err(|e| DeliveryError::InvalidEndpoint(e.to_string()))?;

        // Tokens look like `123456:ABC-DEF`; pushing a segment keeps the colon
        // from being read as a URL scheme.
        endpoint
            .path_segments_mut()
            .map_err(|_| DeliveryError::InvalidEndpoint(format!("{} cannot be a base URL", api_base)))?
            .pop_if_empty()
            .push(&format!("bot{}", bot_token))
            .push("sendMessage");

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            chat_id: chat_id.to_string(),
            parse_mode,
        })
    }

    #[cfg(test)]
    pub(crate) fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: self.parse_mode,
        };

        // `without_url` keeps the token out of error messages.
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let reply: BotApiReply = response.json().await.map_err(|e| {
            DeliveryError::Transport(format!("HTTP {}: {}", status, e.without_url()))
        })?;

        if !reply.ok {
            return Err(DeliveryError::Rejected(
                reply
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        Ok(())
    }
}

/// Result of relaying one report, reported back to the caller as
/// `telegramSent` / `telegramError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub sent: bool,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    /// Credentials absent: nothing attempted, nothing failed.
    pub fn not_configured() -> Self {
        Self { sent: false, error: None }
    }

    pub fn delivered() -> Self {
        Self { sent: true, error: None }
    }

    pub fn failed(err: &DeliveryError) -> Self {
        Self {
            sent: false,
            error: Some(err.to_string()),
        }
    }
}

/// Splits reports into transport-sized chunks and sends them in order.
pub struct ReportSender {
    messenger: Option<Arc<dyn Messenger>>,
    max_message_len: usize,
    chunk_delay: Duration,
}

impl ReportSender {
    pub fn new(
        messenger: Option<Arc<dyn Messenger>>,
        max_message_len: usize,
        chunk_delay: Duration,
    ) -> Self {
        Self {
            messenger,
            max_message_len,
            chunk_delay,
        }
    }

    /// Builds a Telegram-backed sender, or an inert one when either credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, DeliveryError> {
        let messenger: Option<Arc<dyn Messenger>> =
            match (&config.telegram_bot_token, &config.telegram_chat_id) {
                (Some(token), Some(chat_id)) => Some(Arc::new(TelegramClient::new(
                    &config.telegram_api_base,
                    token,
                    chat_id,
                    config.report_style.parse_mode(),
                    Duration::from_secs(config.telegram_timeout_secs),
                )?)),
                _ => None,
            };

        Ok(Self::new(
            messenger,
            MAX_MESSAGE_LEN,
            Duration::from_millis(config.chunk_delay_ms),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.messenger.is_some()
    }

    /// Sends `report` chunk by chunk. Each send waits for the previous one to
    /// resolve, consecutive sends are spaced by the chunk delay, and the first
    /// failure abandons the remaining chunks.
    pub async fn deliver(&self, report: &str) -> DeliveryOutcome {
        let Some(messenger) = &self.messenger else {
            tracing::warn!("Telegram not configured - missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID");
            return DeliveryOutcome::not_configured();
        };

        let chunks = split_message(report, self.max_message_len);
        let total = chunks.len();
        tracing::debug!(
            "Report is {} text units, sending as {} part(s)",
            text_units(report),
            total
        );

        for (i, chunk) in chunks.iter().enumerate() {
            if let Err(e) = messenger.send_text(chunk).await {
                tracing::error!("Telegram part {}/{} failed: {}", i + 1, total, e);
                return DeliveryOutcome::failed(&e);
            }
            tracing::info!("Telegram part {}/{} sent", i + 1, total);

            if i + 1 < total {
                tokio::time::sleep(self.chunk_delay).await;
            }
        }

        DeliveryOutcome::delivered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Records start/end of every send so tests can check ordering.
    #[derive(Default)]
    struct RecordingMessenger {
        events: Mutex<Vec<String>>,
        texts: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
            let call = {
                let mut texts = self.texts.lock().unwrap();
                texts.push(text.to_string());
                texts.len() - 1
            };
            self.events.lock().unwrap().push(format!("start {}", call));
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.events.lock().unwrap().push(format!("end {}", call));

            if self.fail_on_call == Some(call) {
                return Err(DeliveryError::Rejected("Bad Request: chat not found".into()));
            }
            Ok(())
        }
    }

    fn sender_with(messenger: Arc<RecordingMessenger>, max_len: usize, delay: Duration) -> ReportSender {
        ReportSender::new(Some(messenger as Arc<dyn Messenger>), max_len, delay)
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_delivery() {
        let sender = ReportSender::new(None, MAX_MESSAGE_LEN, Duration::ZERO);
        assert!(!sender.is_configured());

        let outcome = sender.deliver("report").await;
        assert_eq!(outcome, DeliveryOutcome::not_configured());
        assert!(!outcome.sent);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_short_report_is_one_message() {
        let messenger = Arc::new(RecordingMessenger::default());
        let sender = sender_with(messenger.clone(), 4000, Duration::ZERO);

        let outcome = sender.deliver("hello").await;
        assert_eq!(outcome, DeliveryOutcome::delivered());
        assert_eq!(*messenger.texts.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_chunks_are_sent_sequentially_with_delay() {
        let messenger = Arc::new(RecordingMessenger::default());
        let sender = sender_with(messenger.clone(), 10, Duration::from_millis(30));

        let started = Instant::now();
        let outcome = sender.deliver(&"x".repeat(25)).await;

        assert!(outcome.sent);
        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(
            *messenger.events.lock().unwrap(),
            vec!["start 0", "end 0", "start 1", "end 1", "start 2", "end 2"]
        );
        assert_eq!(messenger.texts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_first_failure_stops_remaining_chunks() {
        let messenger = Arc::new(RecordingMessenger {
            fail_on_call: Some(0),
            ..Default::default()
        });
        let sender = sender_with(messenger.clone(), 10, Duration::ZERO);

        let outcome = sender.deliver(&"x".repeat(25)).await;

        assert!(!outcome.sent);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Telegram error: Bad Request: chat not found")
        );
        assert_eq!(messenger.texts.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_endpoint_keeps_token_as_one_segment() {
        let client = TelegramClient::new(
            "https://api.telegram.org",
            "123456:ABC-DEF",
            "-100200",
            Some("Markdown"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://api.telegram.org/bot123456:ABC-DEF/sendMessage"
        );

        let proxied = TelegramClient::new(
            "http://127.0.0.1:8081/relay/",
            "1:x",
            "42",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(proxied.endpoint().path(), "/relay/bot1:x/sendMessage");
    }

    #[test]
    fn test_invalid_api_base_is_rejected() {
        let err = TelegramClient::new("not a url", "1:x", "42", None, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, DeliveryError::InvalidEndpoint(_)));

        let err = TelegramClient::new("mailto:bot@example.com", "1:x", "42", None, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, DeliveryError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_request_omits_parse_mode_for_plain() {
        let body = serde_json::to_value(SendMessageRequest {
            chat_id: "42",
            text: "hi",
            parse_mode: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "chat_id": "42", "text": "hi" }));
    }
}
