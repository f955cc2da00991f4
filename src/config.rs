// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::utils::report::ReportStyle;

/// Maximum report text (UTF-16 units) carried by a single Telegram message.
/// Leaves headroom below the Bot API hard limit of 4096.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Default pause between consecutive chunks of one report.
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 1000;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot credential. `None` disables delivery entirely.
    pub telegram_bot_token: Option<String>,
    /// Destination chat or channel id.
    pub telegram_chat_id: Option<String>,
    pub telegram_api_base: String,
    pub telegram_timeout_secs: u64,
    pub chunk_delay_ms: u64,
    pub report_style: ReportStyle,
    pub port: u16,
    pub rust_log: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let telegram_bot_token = non_empty_var("TELEGRAM_BOT_TOKEN");
        let telegram_chat_id = non_empty_var("TELEGRAM_CHAT_ID");

        let telegram_api_base = env::var("TELEGRAM_API_BASE")
            .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_BASE.to_string());

        let telegram_timeout_secs = parsed_var("TELEGRAM_TIMEOUT_SECS").unwrap_or(10);
        let chunk_delay_ms = parsed_var("CHUNK_DELAY_MS").unwrap_or(DEFAULT_CHUNK_DELAY_MS);

        // Unknown styles fall back to markdown; main logs the effective choice.
        let report_style = parsed_var("REPORT_STYLE").unwrap_or_default();

        let port = parsed_var("PORT").unwrap_or(3000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Self {
            telegram_bot_token,
            telegram_chat_id,
            telegram_api_base,
            telegram_timeout_secs,
            chunk_delay_ms,
            report_style,
            port,
            rust_log,
            log_dir,
        }
    }

    /// Both credentials are present.
    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>, chat_id: Option<&str>) -> Config {
        Config {
            telegram_bot_token: token.map(str::to_string),
            telegram_chat_id: chat_id.map(str::to_string),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            telegram_timeout_secs: 10,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
            report_style: ReportStyle::default(),
            port: 3000,
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
        }
    }

    #[test]
    fn test_telegram_needs_both_credentials() {
        assert!(config(Some("1:x"), Some("42")).telegram_enabled());
        assert!(!config(Some("1:x"), None).telegram_enabled());
        assert!(!config(None, Some("42")).telegram_enabled());
        assert!(!config(None, None).telegram_enabled());
    }
}
