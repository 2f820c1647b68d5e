//! Database models
//!
//! Rows are mapped by hand from `SqliteRow`; enum columns are stored as
//! lowercase TEXT and parsed through `FromStr`.

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Highest word priority (0 = normal, 1 = important, 2 = core)
pub const MAX_PRIORITY: i64 = 2;

/// Lowest word priority
pub const MIN_PRIORITY: i64 = 0;

/// Word difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    One,
    Two,
    Three,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::One => "one",
            Level::Two => "two",
            Level::Three => "three",
        }
    }

    /// Lenient level parsing used by bulk import: `one…`, `two…`, anything else is three
    pub fn from_prefix(raw: &str) -> Self {
        let raw = raw.trim().to_lowercase();
        if raw.starts_with("one") {
            Level::One
        } else if raw.starts_with("two") {
            Level::Two
        } else {
            Level::Three
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "one" => Ok(Level::One),
            "two" => Ok(Level::Two),
            "three" => Ok(Level::Three),
            other => Err(Error::InvalidInput(format!("Unknown level: {}", other))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The single session currently accepting record toggles
    Open,
    /// Closed session, read-only
    Posted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Posted => "posted",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(SessionStatus::Open),
            "posted" => Ok(SessionStatus::Posted),
            other => Err(Error::Internal(format!("Unknown session status: {}", other))),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one word in one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordResult {
    Success,
    Fail,
}

impl RecordResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordResult::Success => "success",
            RecordResult::Fail => "fail",
        }
    }
}

impl FromStr for RecordResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(RecordResult::Success),
            "fail" => Ok(RecordResult::Fail),
            other => Err(Error::Internal(format!("Unknown record result: {}", other))),
        }
    }
}

impl fmt::Display for RecordResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vocabulary item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub text: String,
    pub alphabet: Option<String>,
    pub level: Level,
    pub priority: i64,
    pub bookmarked: bool,
    pub active: bool,
    pub meaning: Option<String>,
    pub nickname: Option<String>,
    pub definition: Option<String>,
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Column list matching [`Word::from_row`]
pub const WORD_COLUMNS: &str = "guid, text, alphabet, level, priority, bookmarked, active, \
     meaning, nickname, definition, source, created_at, updated_at";

impl Word {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let level: String = row.try_get("level")?;
        Ok(Self {
            id: row.try_get("guid")?,
            text: row.try_get("text")?,
            alphabet: row.try_get("alphabet")?,
            level: level
                .parse()
                .map_err(|_| Error::Internal(format!("Corrupt word level: {}", level)))?,
            priority: row.try_get("priority")?,
            bookmarked: row.try_get("bookmarked")?,
            active: row.try_get("active")?,
            meaning: row.try_get("meaning")?,
            nickname: row.try_get("nickname")?,
            definition: row.try_get("definition")?,
            source: row.try_get("source")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Cached meaning, treating an empty string as missing
    pub fn cached_meaning(&self) -> Option<&str> {
        self.meaning.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Dated practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// `YYYY-MM-DD-N`
    pub label: String,
    pub date: String,
    pub sequence: i64,
    pub status: SessionStatus,
    pub created_at: String,
}

/// Column list matching [`Session::from_row`]
pub const SESSION_COLUMNS: &str = "guid, label, date, sequence, status, created_at";

impl Session {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("guid")?,
            label: row.try_get("label")?,
            date: row.try_get("date")?,
            sequence: row.try_get("sequence")?,
            status: status.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Pass/fail outcome for one (word, session) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub word_id: String,
    pub session_id: String,
    pub result: RecordResult,
    pub created_at: String,
}

/// Column list matching [`Record::from_row`]
pub const RECORD_COLUMNS: &str = "guid, word_id, session_id, result, created_at";

impl Record {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let result: String = row.try_get("result")?;
        Ok(Self {
            id: row.try_get("guid")?,
            word_id: row.try_get("word_id")?,
            session_id: row.try_get("session_id")?,
            result: result.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Per-word success/attempt counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStats {
    pub success: i64,
    pub attempts: i64,
}

impl WordStats {
    /// Success ratio in `[0, 1]`; a word never attempted rates 0
    pub fn rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.success as f64 / self.attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_prefix() {
        assert_eq!(Level::from_prefix("one bee"), Level::One);
        assert_eq!(Level::from_prefix(" Two Bee"), Level::Two);
        assert_eq!(Level::from_prefix("three bee"), Level::Three);
        assert_eq!(Level::from_prefix("anything"), Level::Three);
        assert_eq!(Level::from_prefix(""), Level::Three);
    }

    #[test]
    fn test_level_strict_parse() {
        assert_eq!("two".parse::<Level>().unwrap(), Level::Two);
        assert!(matches!("four".parse::<Level>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_enum_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&SessionStatus::Posted).unwrap(), "\"posted\"");
        assert_eq!(serde_json::to_string(&RecordResult::Fail).unwrap(), "\"fail\"");
        assert_eq!(serde_json::from_str::<Level>("\"three\"").unwrap(), Level::Three);
    }

    #[test]
    fn test_rate_without_attempts_is_zero() {
        assert_eq!(WordStats::default().rate(), 0.0);
        let stats = WordStats { success: 3, attempts: 4 };
        assert!((stats.rate() - 0.75).abs() < f64::EPSILON);
    }
}
