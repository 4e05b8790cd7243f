//! User-facing text sent by the bot.

pub const START_COMMAND: &str = "/start";

pub const START_PROMPT: &str = "Send me your date of birth in the format \"10.11.2010\"";

pub const INVALID_DATE_FORMAT: &str = "Invalid date format";

pub fn time_left(breakdown: &str) -> String {
    format!("Time left to live:\n{breakdown}")
}
