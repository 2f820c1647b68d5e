//! Record queries

use sqlx::{Executor, Sqlite};
use vocab_common::db::{Record, RecordResult, RECORD_COLUMNS};
use vocab_common::Result;

pub async fn list_records<'e, E>(executor: E) -> Result<Vec<Record>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM records ORDER BY created_at ASC", RECORD_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(executor).await?;
    rows.iter().map(Record::from_row).collect()
}

/// The record for one (word, session) pair, if any
pub async fn find_record<'e, E>(executor: E, word_id: &str, session_id: &str) -> Result<Option<Record>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM records WHERE word_id = ? AND session_id = ?",
        RECORD_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(word_id)
        .bind(session_id)
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(Record::from_row).transpose()
}

pub async fn insert_record<'e, E>(executor: E, record: &Record) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO records (guid, word_id, session_id, result, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.word_id)
    .bind(&record.session_id)
    .bind(record.result.as_str())
    .bind(&record.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_result<'e, E>(executor: E, id: &str, result: RecordResult) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE records SET result = ? WHERE guid = ?")
        .bind(result.as_str())
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn delete_record<'e, E>(executor: E, id: &str) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("DELETE FROM records WHERE guid = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Remove every record of a session; returns the number removed
pub async fn delete_for_session<'e, E>(executor: E, session_id: &str) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM records WHERE session_id = ?")
        .bind(session_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
