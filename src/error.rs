use thiserror::Error;

/// Reasons a birth date cannot be turned into a remaining lifetime.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifespanError {
    /// Input does not have the `dd.mm.yyyy` shape.
    #[error("'{input}' does not match the dd.mm.yyyy date format")]
    InvalidFormat { input: String },

    /// Input has the right shape but names a day that does not exist, e.g. `31.02.2020`.
    #[error("'{input}' is not a real calendar date")]
    UnparsableDate { input: String },

    #[error("projected date for '{input}' is out of range")]
    OutOfRange { input: String },
}

/// Errors returned by the Telegram Bot API client.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("network error talking to Telegram: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `ok: false`.
    #[error("Telegram API error [{code}]: {description}")]
    Api { code: i64, description: String },

    #[error("Telegram API returned 429 (rate-limited) and retries exhausted")]
    RateLimited,

    #[error("failed to decode Telegram response: {0}")]
    Decode(#[from] serde_json::Error),
}
