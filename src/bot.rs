use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{LifespanError, TelegramError};
use crate::lifespan;
use crate::messages;
use crate::telegram::{TelegramClient, Update};

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Reply text for one incoming message, with `now` as the current local time.
pub fn reply_for(text: &str, now: NaiveDateTime) -> String {
    if text == messages::START_COMMAND {
        return messages::START_PROMPT.to_string();
    }

    match lifespan::calculate_remaining(text, now) {
        Ok(remaining) => messages::time_left(&lifespan::format_duration(remaining)),
        Err(e @ LifespanError::InvalidFormat { .. }) => {
            tracing::debug!("{e}");
            messages::INVALID_DATE_FORMAT.to_string()
        }
        Err(e) => {
            tracing::warn!("{e}");
            messages::INVALID_DATE_FORMAT.to_string()
        }
    }
}

/// Poll until Ctrl-C. Fails only if the bot cannot identify itself on startup.
pub async fn run(client: TelegramClient, poll_timeout_secs: u64) -> Result<()> {
    let me = client
        .get_me()
        .await
        .context("Failed to reach Telegram with the configured token")?;
    tracing::info!(
        id = me.id,
        username = me.username.as_deref().unwrap_or("unknown"),
        "Bot started, waiting for messages"
    );

    let mut offset = 0;
    loop {
        // Only the long poll is cancellable; a fetched batch is always answered
        // so the next offset is never lost.
        let polled = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            polled = client.get_updates(offset, poll_timeout_secs) => polled,
        };

        match polled {
            Ok(updates) => offset = answer_updates(&client, offset, updates).await,
            Err(e) => {
                log_polling_error(&e);
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = sleep(ERROR_BACKOFF) => {}
                }
            }
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Answer each update of a fetched batch and return the next offset.
pub async fn answer_updates(client: &TelegramClient, offset: i64, updates: Vec<Update>) -> i64 {
    let mut next = offset;
    for update in updates {
        next = next.max(update.update_id + 1);
        handle_update(client, update).await;
    }
    next
}

async fn handle_update(client: &TelegramClient, update: Update) {
    let Some(message) = update.message else {
        return;
    };
    let Some(text) = message.text else {
        return;
    };
    let chat_id = message.chat.id;

    tracing::info!(chat_id, "Received '{text}'");

    let reply = reply_for(&text, Local::now().naive_local());
    if let Err(e) = client.send_message(chat_id, &reply).await {
        tracing::error!(chat_id, "Failed to send reply: {e}");
    }
}

fn log_polling_error(error: &TelegramError) {
    match error {
        TelegramError::Api { code, description } => {
            tracing::error!("Telegram API Error:\n[{code}]\n{description}")
        }
        other => tracing::error!("Polling failed: {other}"),
    }
}
