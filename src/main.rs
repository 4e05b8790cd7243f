mod bot;
mod config;
mod error;
mod lifespan;
mod logger;
mod messages;
mod telegram;

use anyhow::Result;
use config::Config;
use telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first so RUST_LOG from .env reaches the logger
    let config = Config::from_env()?;
    logger::init_logger();

    let client = TelegramClient::new(&config)?;
    bot::run(client, config.poll_timeout_secs).await
}
