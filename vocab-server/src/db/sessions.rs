//! Session queries

use sqlx::{Executor, Sqlite};
use vocab_common::db::{Session, SessionStatus, SESSION_COLUMNS};
use vocab_common::Result;

/// All sessions, newest first
pub async fn list_sessions<'e, E>(executor: E) -> Result<Vec<Session>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM sessions ORDER BY date DESC, sequence DESC",
        SESSION_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(executor).await?;
    rows.iter().map(Session::from_row).collect()
}

pub async fn get_session<'e, E>(executor: E, id: &str) -> Result<Option<Session>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM sessions WHERE guid = ?", SESSION_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(Session::from_row).transpose()
}

/// Newest session with the given status
pub async fn latest_with_status<'e, E>(executor: E, status: SessionStatus) -> Result<Option<Session>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM sessions WHERE status = ? ORDER BY date DESC, sequence DESC LIMIT 1",
        SESSION_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(status.as_str())
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(Session::from_row).transpose()
}

/// Next per-day sequence number for `date` (1 when the day has no sessions)
pub async fn next_sequence<'e, E>(executor: E, date: &str) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let last: Option<i64> = sqlx::query_scalar("SELECT MAX(sequence) FROM sessions WHERE date = ?")
        .bind(date)
        .fetch_one(executor)
        .await?;

    Ok(last.map_or(1, |seq| seq + 1))
}

pub async fn insert_session<'e, E>(executor: E, session: &Session) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO sessions (guid, label, date, sequence, status, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&session.id)
    .bind(&session.label)
    .bind(&session.date)
    .bind(session.sequence)
    .bind(session.status.as_str())
    .bind(&session.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Move every open session to posted; returns how many were closed
pub async fn post_open_sessions<'e, E>(executor: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE sessions SET status = 'posted' WHERE status = 'open'")
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn set_status<'e, E>(executor: E, id: &str, status: SessionStatus) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE sessions SET status = ? WHERE guid = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Delete a session; its records cascade
pub async fn delete_session<'e, E>(executor: E, id: &str) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM sessions WHERE guid = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}
