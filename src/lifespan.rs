//! lifespan.rs
//!
//! Turns a birth date typed by a user into the time left until a fixed
//! projected age, rendered as:
//!     "X years,\nY months,\nZ days,\nH hours,\nM minutes"
//!
//! The projected date is the birth date plus 70 calendar years plus a
//! fractional-year adjustment (0.06 of an average Gregorian year), truncated
//! to whole days. The year/month/day breakdown uses average lengths
//! (365.2425 and 30.4368 days) rather than calendar borrowing, and every
//! component is truncated toward zero. Spans already in the past therefore
//! render with all components zero or negative.

use std::sync::LazyLock;

use chrono::{Days, Months, NaiveDate, NaiveDateTime, TimeDelta};
use regex::Regex;

use crate::error::LifespanError;

const DAYS_PER_YEAR: f64 = 365.2425;
const DAYS_PER_MONTH: f64 = 30.4368;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

const LIFESPAN_YEARS: u32 = 70;
const EXTRA_YEAR_FRACTION: f64 = 0.06;

const DATE_FORMAT: &str = "%d.%m.%Y";

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|[12][0-9]|3[01])\.(0[1-9]|1[0-2])\.(19|20)[0-9]{2}$")
        .expect("date pattern is a valid regex")
});

/// Lexical check only: `31.02.2020` passes.
pub fn is_valid_date(input: &str) -> bool {
    DATE_PATTERN.is_match(input)
}

/// Lexical check followed by a strict calendar parse.
pub fn parse_birth_date(input: &str) -> Result<NaiveDate, LifespanError> {
    if !is_valid_date(input) {
        return Err(LifespanError::InvalidFormat {
            input: input.to_string(),
        });
    }
    strict_parse(input)
}

/// Time left from `now` until the projected date for `date_str`.
///
/// Validation is the same as [`parse_birth_date`]. The result is negative
/// when the projected date has already passed.
pub fn calculate_remaining(date_str: &str, now: NaiveDateTime) -> Result<TimeDelta, LifespanError> {
    let birthdate = parse_birth_date(date_str)?;
    let target = target_instant(birthdate).ok_or_else(|| LifespanError::OutOfRange {
        input: date_str.to_string(),
    })?;
    Ok(target - now)
}

/// Midnight of birth date + 70 years + the truncated fractional-year offset.
///
/// Year addition is month arithmetic, so 29 February lands on 28 February
/// when the target year is not a leap year.
pub fn target_instant(birthdate: NaiveDate) -> Option<NaiveDateTime> {
    birthdate
        .checked_add_months(Months::new(LIFESPAN_YEARS * 12))?
        .checked_add_days(Days::new(extra_days()))?
        .and_hms_opt(0, 0, 0)
}

/// Renders a span as five lines: years, months, days, hours, minutes.
pub fn format_duration(span: TimeDelta) -> String {
    let total_days = span.num_milliseconds() as f64 / MILLIS_PER_DAY;

    let years = (total_days / DAYS_PER_YEAR) as i64;
    // Days come from what is left after whole years, like months; the
    // remainder of the whole span drifts by 0.0009 days per year and wraps.
    let within_year = total_days % DAYS_PER_YEAR;
    let months = (within_year / DAYS_PER_MONTH) as i64;
    let days = (within_year % DAYS_PER_MONTH) as i64;
    let hours = span.num_hours() % 24;
    let minutes = span.num_minutes() % 60;

    format!(
        "{} year{},\n{} month{},\n{} day{},\n{} hour{},\n{} minute{}",
        years,
        plural(years),
        months,
        plural(months),
        days,
        plural(days),
        hours,
        plural(hours),
        minutes,
        plural(minutes)
    )
}

fn strict_parse(input: &str) -> Result<NaiveDate, LifespanError> {
    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| LifespanError::UnparsableDate {
        input: input.to_string(),
    })
}

fn extra_days() -> u64 {
    (EXTRA_YEAR_FRACTION * DAYS_PER_YEAR) as u64
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
