use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

static DATE_KEY_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date key pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateKeyError {
    #[error("invalid date format '{0}', use YYYY-MM-DD")]
    InvalidFormat(String),
}

/// Formats a local calendar date as a zero-padded `YYYY-MM-DD` key.
pub fn encode(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` key back into a calendar date.
///
/// The key must have the exact shape and name a day that exists, so
/// `2024-02-30` is rejected even though it looks right.
pub fn decode(key: &str) -> Result<NaiveDate, DateKeyError> {
    if !DATE_KEY_SHAPE.is_match(key) {
        return Err(DateKeyError::InvalidFormat(key.to_owned()));
    }

    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|_| DateKeyError::InvalidFormat(key.to_owned()))
}

pub fn is_future(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
