#![doc = "Telegram Bot API channel: bridges the core `Channel` contract to the HTTP API."]
//
//! # Telegram channel
//!
//! [`TelegramChannel`] implements [`book_courier_core::contract::Channel`] by posting
//! multipart requests to the Bot API:
//!
//! - images go through `sendPhoto` (form field `photo`)
//! - everything else goes through `sendDocument` (form field `document`)
//!
//! Both calls carry `chat_id` and `caption`. A response is a success only when
//! the HTTP status is 2xx and the JSON body says `"ok": true`; otherwise the
//! API `description` is returned as the error.
//!
//! The bot token is part of the request URL, so it is never logged and the
//! `Debug` impl of [`TelegramConfig`] redacts it.

use async_trait::async_trait;
use book_courier_core::contract::{Channel, ChannelError, MediaKind, OutgoingPost};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Channel username (`@name`) or numeric chat id.
    pub chat_id: String,
    pub api_base: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramChannel {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        tracing::info!(
            chat_id = %config.chat_id,
            api_base = %config.api_base,
            timeout_secs = config.request_timeout.as_secs(),
            "Initialized TelegramChannel"
        );
        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }
}

fn method_for(kind: MediaKind) -> (&'static str, &'static str) {
    match kind {
        MediaKind::Image => ("sendPhoto", "photo"),
        MediaKind::Document => ("sendDocument", "document"),
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    async fn send(&self, post: OutgoingPost) -> Result<(), ChannelError> {
        let (method, field) = method_for(post.kind);
        tracing::info!(
            filename = %post.filename,
            method,
            size = post.bytes.len(),
            "Sending file to Telegram"
        );

        let part = Part::bytes(post.bytes).file_name(post.filename.clone());
        // Filenames go out as raw UTF-8 in Content-Disposition, not percent-encoded.
        let form = Form::new()
            .percent_encode_noop()
            .text("chat_id", self.config.chat_id.clone())
            .text("caption", post.caption)
            .part(field, part);

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                // reqwest includes the URL (and so the token) in its errors.
                tracing::error!(filename = %post.filename, method, "Telegram request failed");
                format!("Telegram {method} request failed: {}", e.without_url())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => {
                tracing::info!(filename = %post.filename, method, "Telegram accepted file");
                Ok(())
            }
            Some(api) => {
                let description = api.description.unwrap_or_else(|| "no description".into());
                tracing::error!(
                    filename = %post.filename,
                    status = status.as_u16(),
                    description = %description,
                    "Telegram rejected file"
                );
                Err(format!("Telegram {method} rejected ({status}): {description}").into())
            }
            None => {
                tracing::error!(
                    filename = %post.filename,
                    status = status.as_u16(),
                    "Telegram returned a non-JSON response"
                );
                Err(format!("Telegram {method} returned {status} with unreadable body").into())
            }
        }
    }
}
