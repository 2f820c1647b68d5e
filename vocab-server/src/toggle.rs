//! Record toggle state machine
//!
//! Clicking a cell of the open session cycles its record:
//!
//! | current | next    | priority |
//! |---------|---------|----------|
//! | absent  | success | 0        |
//! | success | fail    | +1       |
//! | fail    | absent  | -1       |
//!
//! Priority stays within 0..=2. The record write and the priority
//! adjustment commit together.

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use vocab_common::db::{begin_write, Record, RecordResult};
use vocab_common::{time, uuid_utils};

use crate::db::{records, sessions, words};

/// One step of the record cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    /// absent -> success
    Create,
    /// success -> fail
    MarkFail,
    /// fail -> absent
    Remove,
}

impl ToggleStep {
    /// Step taken from the current record state
    pub fn from_current(current: Option<RecordResult>) -> Self {
        match current {
            None => ToggleStep::Create,
            Some(RecordResult::Success) => ToggleStep::MarkFail,
            Some(RecordResult::Fail) => ToggleStep::Remove,
        }
    }

    /// Record state after the step
    pub fn next_result(self) -> Option<RecordResult> {
        match self {
            ToggleStep::Create => Some(RecordResult::Success),
            ToggleStep::MarkFail => Some(RecordResult::Fail),
            ToggleStep::Remove => None,
        }
    }

    /// Priority change applied to the word
    ///
    /// A failure raises the word's priority; clearing the failure gives it back.
    pub fn priority_delta(self) -> i64 {
        match self {
            ToggleStep::Create => 0,
            ToggleStep::MarkFail => 1,
            ToggleStep::Remove => -1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("Session is not editable")]
    SessionNotEditable,

    #[error("Word not found")]
    WordNotFound,

    #[error(transparent)]
    Store(#[from] vocab_common::Error),
}

impl From<sqlx::Error> for ToggleError {
    fn from(err: sqlx::Error) -> Self {
        ToggleError::Store(err.into())
    }
}

/// Result of a toggle as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToggleOutcome {
    /// Record created or updated
    Record {
        #[serde(flatten)]
        record: Record,
        priority: i64,
    },
    /// Record removed
    Deleted { deleted: bool, priority: i64 },
}

/// Advance the record of (`word_id`, `session_id`) by one step
///
/// Fails with [`ToggleError::SessionNotEditable`] unless the session exists
/// and is open.
pub async fn toggle_record(
    pool: &SqlitePool,
    word_id: &str,
    session_id: &str,
) -> Result<ToggleOutcome, ToggleError> {
    let mut tx = begin_write(pool).await?;

    let session = sessions::get_session(&mut *tx, session_id).await?;
    if !session.as_ref().is_some_and(|s| s.is_open()) {
        return Err(ToggleError::SessionNotEditable);
    }

    let word = words::get_word(&mut *tx, word_id)
        .await?
        .ok_or(ToggleError::WordNotFound)?;

    let current = records::find_record(&mut *tx, word_id, session_id).await?;
    let step = ToggleStep::from_current(current.as_ref().map(|r| r.result));
    let now = time::now_rfc3339();

    let record = match current {
        None => {
            let record = Record {
                id: uuid_utils::generate_string(),
                word_id: word_id.to_string(),
                session_id: session_id.to_string(),
                result: RecordResult::Success,
                created_at: now.clone(),
            };
            records::insert_record(&mut *tx, &record).await?;
            Some(record)
        }
        Some(mut record) => match step.next_result() {
            Some(result) => {
                records::set_result(&mut *tx, &record.id, result).await?;
                record.result = result;
                Some(record)
            }
            None => {
                records::delete_record(&mut *tx, &record.id).await?;
                None
            }
        },
    };

    let priority = match step.priority_delta() {
        0 => word.priority,
        delta => words::adjust_priority(&mut *tx, word_id, delta, &now)
            .await?
            .unwrap_or(word.priority),
    };

    tx.commit().await?;

    debug!(
        word = %word.text,
        session = %session_id,
        step = ?step,
        priority,
        "Record toggled"
    );

    Ok(match record {
        Some(record) => ToggleOutcome::Record { record, priority },
        None => ToggleOutcome::Deleted {
            deleted: true,
            priority,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_returns_to_absent() {
        let mut state = None;
        let mut seen = Vec::new();
        for _ in 0..3 {
            let step = ToggleStep::from_current(state);
            state = step.next_result();
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![Some(RecordResult::Success), Some(RecordResult::Fail), None]
        );
    }

    #[test]
    fn test_full_cycle_priority_is_neutral() {
        let total: i64 = [ToggleStep::Create, ToggleStep::MarkFail, ToggleStep::Remove]
            .iter()
            .map(|s| s.priority_delta())
            .sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_step_from_current() {
        assert_eq!(ToggleStep::from_current(None), ToggleStep::Create);
        assert_eq!(
            ToggleStep::from_current(Some(RecordResult::Success)),
            ToggleStep::MarkFail
        );
        assert_eq!(
            ToggleStep::from_current(Some(RecordResult::Fail)),
            ToggleStep::Remove
        );
    }

    #[test]
    fn test_outcome_serialization_shapes() {
        let deleted = ToggleOutcome::Deleted {
            deleted: true,
            priority: 1,
        };
        let json = serde_json::to_value(&deleted).unwrap();
        assert_eq!(json["deleted"], true);
        assert_eq!(json["priority"], 1);

        let record = ToggleOutcome::Record {
            record: Record {
                id: "r".into(),
                word_id: "w".into(),
                session_id: "s".into(),
                result: RecordResult::Success,
                created_at: "t".into(),
            },
            priority: 0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["result"], "success");
        assert_eq!(json["word_id"], "w");
        assert_eq!(json["priority"], 0);
    }
}
