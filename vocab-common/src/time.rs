//! Timestamp and session-date utilities

use chrono::{NaiveDate, SecondsFormat, Utc};

/// Current UTC timestamp in the RFC 3339 form stored in the database
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Today's session date (UTC calendar day)
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a session date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build the human label of a session: `YYYY-MM-DD-N`
pub fn session_label(date: NaiveDate, sequence: i64) -> String {
    format!("{}-{}", format_date(date), sequence)
}
