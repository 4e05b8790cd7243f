use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::Config;
use crate::error::TelegramError;

const MAX_RETRIES: usize = 4;
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;
// Headroom on top of the long-poll timeout before the HTTP client gives up.
const REQUEST_TIMEOUT_SLACK_SECS: u64 = 10;

/// Envelope wrapping every Bot API response.
#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone)]
pub struct TelegramClient {
    base_url: Arc<String>,
    http: Arc<Client>,
}

impl TelegramClient {
    /// Create a Bot API client for the token and endpoint in `config`.
    pub fn new(config: &Config) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(
                config
                    .poll_timeout_secs
                    .saturating_add(REQUEST_TIMEOUT_SLACK_SECS),
            ))
            .build()
            .map_err(|e| TelegramError::Http(e.without_url()))?;

        Ok(Self {
            base_url: Arc::new(format!("{}/bot{}", config.api_url, config.bot_token)),
            http: Arc::new(http),
        })
    }

    /// Low-level Bot API call with basic retry/backoff and `ok` checking.
    ///
    /// Request URLs embed the bot token, so they are stripped from transport errors.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TelegramError> {
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            let resp = self
                .http
                .post(format!("{}/{method}", self.base_url))
                .json(body)
                .send()
                .await
                .map_err(|e| TelegramError::Http(e.without_url()))?;

            let status = resp.status();

            // Retry on 5xx before decoding, proxies in front of the API may not answer JSON
            if status.is_server_error() && attempt < MAX_RETRIES {
                let backoff = Duration::from_millis(250u64.saturating_mul(1 << (attempt - 1)));
                tracing::debug!(method, %status, ?backoff, "Retrying Telegram request");
                sleep(backoff).await;
                continue;
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| TelegramError::Http(e.without_url()))?;
            let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
                Ok(envelope) => envelope,
                // Retries exhausted and the body is not a Bot API envelope; keep the status
                Err(_) if status.is_server_error() => {
                    return Err(TelegramError::Api {
                        code: i64::from(status.as_u16()),
                        description: format!("{method} failed with HTTP {status}"),
                    });
                }
                Err(e) => return Err(e.into()),
            };

            if envelope.ok {
                return envelope.result.ok_or_else(|| TelegramError::Api {
                    code: i64::from(status.as_u16()),
                    description: format!("{method} returned ok without a result"),
                });
            }

            let code = envelope
                .error_code
                .unwrap_or_else(|| i64::from(status.as_u16()));

            // If rate limited, honor retry_after when present
            if code == i64::from(StatusCode::TOO_MANY_REQUESTS.as_u16()) {
                if attempt >= MAX_RETRIES {
                    return Err(TelegramError::RateLimited);
                }
                let wait_secs = envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                tracing::warn!(method, wait_secs, "Rate limited by Telegram");
                sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }

            return Err(TelegramError::Api {
                code,
                description: envelope.description.unwrap_or_default(),
            });
        }
    }

    /// Identity of the bot owning the token.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({})).await
    }

    /// Long-poll for updates with id >= `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        self.call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }
}
