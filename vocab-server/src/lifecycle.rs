//! Session lifecycle
//!
//! Exactly one session is `open` while any session exists:
//! - opening a new session posts the current one;
//! - deleting the open session drops its records and reopens the newest
//!   posted session, or starts a fresh one when none is left.
//!
//! Each operation runs in a single transaction.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use vocab_common::db::{begin_write, Session, SessionStatus};
use vocab_common::{time, uuid_utils};

use crate::db::{records, sessions};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("No open session")]
    NoOpenSession,

    #[error(transparent)]
    Store(#[from] vocab_common::Error),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        LifecycleError::Store(err.into())
    }
}

/// What `delete_current_session` did, by session label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reopened: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

fn new_open_session(date: NaiveDate, sequence: i64) -> Session {
    Session {
        id: uuid_utils::generate_string(),
        label: time::session_label(date, sequence),
        date: time::format_date(date),
        sequence,
        status: SessionStatus::Open,
        created_at: time::now_rfc3339(),
    }
}

/// Post the open session (if any) and open `{date}-{next sequence}`
pub async fn open_new_session(pool: &SqlitePool, date: NaiveDate) -> Result<Session, LifecycleError> {
    let mut tx = begin_write(pool).await?;

    let posted = sessions::post_open_sessions(&mut *tx).await?;
    let sequence = sessions::next_sequence(&mut *tx, &time::format_date(date)).await?;
    let session = new_open_session(date, sequence);
    sessions::insert_session(&mut *tx, &session).await?;

    tx.commit().await?;

    info!(
        label = %session.label,
        posted,
        "Opened new session"
    );

    Ok(session)
}

/// Delete the open session and its records, then reopen the newest posted one
///
/// When no posted session remains a new open session is created for `date`.
pub async fn delete_current_session(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<DeleteOutcome, LifecycleError> {
    let mut tx = begin_write(pool).await?;

    let current = sessions::latest_with_status(&mut *tx, SessionStatus::Open)
        .await?
        .ok_or(LifecycleError::NoOpenSession)?;

    let removed = records::delete_for_session(&mut *tx, &current.id).await?;
    sessions::delete_session(&mut *tx, &current.id).await?;

    let outcome = match sessions::latest_with_status(&mut *tx, SessionStatus::Posted).await? {
        Some(previous) => {
            sessions::set_status(&mut *tx, &previous.id, SessionStatus::Open).await?;
            DeleteOutcome {
                deleted: current.label.clone(),
                reopened: Some(previous.label),
                created: None,
            }
        }
        None => {
            let sequence = sessions::next_sequence(&mut *tx, &time::format_date(date)).await?;
            let session = new_open_session(date, sequence);
            sessions::insert_session(&mut *tx, &session).await?;
            DeleteOutcome {
                deleted: current.label.clone(),
                reopened: None,
                created: Some(session.label),
            }
        }
    };

    tx.commit().await?;

    info!(
        deleted = %outcome.deleted,
        records = removed,
        reopened = ?outcome.reopened,
        created = ?outcome.created,
        "Deleted current session"
    );

    Ok(outcome)
}
