use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
// Longest long-poll Telegram honors for getUpdates.
const MAX_POLL_TIMEOUT_SECS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Config {
    /// Read configuration from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("Failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .context("TELEGRAM_BOT_TOKEN environment variable not set")?;

        let api_url = lookup("TELEGRAM_API_URL")
            .filter(|u| !u.trim().is_empty())
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let poll_timeout_secs = match lookup("POLL_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("POLL_TIMEOUT_SECS must be a whole number, got '{raw}'"))?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };
        if poll_timeout_secs > MAX_POLL_TIMEOUT_SECS {
            anyhow::bail!(
                "POLL_TIMEOUT_SECS must be at most {MAX_POLL_TIMEOUT_SECS}, got {poll_timeout_secs}"
            );
        }

        Ok(Self {
            bot_token,
            api_url,
            poll_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn blank_token_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "  ")])).is_err());
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.api_url, "https://api.telegram.org");
        assert_eq!(config.poll_timeout_secs, 30);
    }

    #[test]
    fn overrides_apply() {
        let config = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_API_URL", "http://localhost:8081/"),
            ("POLL_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:8081");
        assert_eq!(config.poll_timeout_secs, 5);
    }

    #[test]
    fn token_is_trimmed() {
        let config =
            Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "  123:abc \n")])).unwrap();
        assert_eq!(config.bot_token, "123:abc");
    }

    #[test]
    fn out_of_range_timeout_is_an_error() {
        for raw in ["51", "18446744073709551615"] {
            let result = Config::from_lookup(lookup(&[
                ("TELEGRAM_BOT_TOKEN", "123:abc"),
                ("POLL_TIMEOUT_SECS", raw),
            ]));
            assert!(result.is_err(), "{raw} should be rejected");
        }
        let edge = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("POLL_TIMEOUT_SECS", "50"),
        ]))
        .unwrap();
        assert_eq!(edge.poll_timeout_secs, 50);
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let result = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("POLL_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
