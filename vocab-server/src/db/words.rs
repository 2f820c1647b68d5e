//! Word queries

use sqlx::{Executor, QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::HashSet;
use vocab_common::db::{Level, Word, MAX_PRIORITY, MIN_PRIORITY, WORD_COLUMNS};
use vocab_common::Result;

/// Insert a fully-populated word row
pub async fn insert_word<'e, E>(executor: E, word: &Word) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO words (
            guid, text, alphabet, level, priority, bookmarked, active,
            meaning, nickname, definition, source, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&word.id)
    .bind(&word.text)
    .bind(&word.alphabet)
    .bind(word.level.as_str())
    .bind(word.priority)
    .bind(word.bookmarked)
    .bind(word.active)
    .bind(&word.meaning)
    .bind(&word.nickname)
    .bind(&word.definition)
    .bind(&word.source)
    .bind(&word.created_at)
    .bind(&word.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// All words in creation order; `active_only` hides inactive words
pub async fn list_words<'e, E>(executor: E, active_only: bool) -> Result<Vec<Word>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let filter = if active_only { "WHERE active = 1" } else { "" };
    let sql = format!(
        "SELECT {} FROM words {} ORDER BY created_at ASC, rowid ASC",
        WORD_COLUMNS, filter
    );

    let rows = sqlx::query(&sql).fetch_all(executor).await?;
    rows.iter().map(Word::from_row).collect()
}

pub async fn get_word<'e, E>(executor: E, id: &str) -> Result<Option<Word>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM words WHERE guid = ?", WORD_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;
    row.as_ref().map(Word::from_row).transpose()
}

/// Delete a word; its records cascade. Returns whether a row was removed.
pub async fn delete_word<'e, E>(executor: E, id: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM words WHERE guid = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Texts bound per `IN (...)` lookup, well under SQLite's variable limit
const TEXT_LOOKUP_CHUNK: usize = 500;

/// Which of `texts` already exist in the store
pub async fn existing_texts(conn: &mut SqliteConnection, texts: &[String]) -> Result<HashSet<String>> {
    let mut found = HashSet::new();

    for chunk in texts.chunks(TEXT_LOOKUP_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT text FROM words WHERE text IN (");
        let mut separated = builder.separated(", ");
        for text in chunk {
            separated.push_bind(text);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&mut *conn).await?;
        for row in &rows {
            found.insert(row.try_get::<String, _>("text")?);
        }
    }

    Ok(found)
}

/// Add `delta` to a word's priority, clamped to `MIN_PRIORITY..=MAX_PRIORITY`.
///
/// Returns the new priority, or `None` when the word does not exist.
pub async fn adjust_priority<'e, E>(executor: E, id: &str, delta: i64, now: &str) -> Result<Option<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let priority: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE words
        SET priority = MAX(?, MIN(?, priority + ?)), updated_at = ?
        WHERE guid = ?
        RETURNING priority
        "#,
    )
    .bind(MIN_PRIORITY)
    .bind(MAX_PRIORITY)
    .bind(delta)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(priority)
}

/// Flip the bookmark flag; returns the new value
pub async fn toggle_bookmark<'e, E>(executor: E, id: &str, now: &str) -> Result<Option<bool>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let bookmarked: Option<bool> = sqlx::query_scalar(
        r#"
        UPDATE words
        SET bookmarked = NOT bookmarked, updated_at = ?
        WHERE guid = ?
        RETURNING bookmarked
        "#,
    )
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(bookmarked)
}

/// Hide or unhide a word; returns whether the word exists
pub async fn set_active<'e, E>(executor: E, id: &str, active: bool, now: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE words SET active = ?, updated_at = ? WHERE guid = ?")
        .bind(active)
        .bind(now)
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Cache a looked-up meaning; nickname/definition are only overwritten when given
pub async fn set_meaning<'e, E>(
    executor: E,
    id: &str,
    meaning: &str,
    nickname: Option<&str>,
    definition: Option<&str>,
    now: &str,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE words
        SET meaning = ?,
            nickname = COALESCE(?, nickname),
            definition = COALESCE(?, definition),
            updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(meaning)
    .bind(nickname)
    .bind(definition)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;

    Ok(())
}

/// Clear every non-empty cached meaning; returns the number of rows changed
pub async fn clear_meanings<'e, E>(executor: E, now: &str) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE words SET meaning = '', updated_at = ? WHERE meaning IS NOT NULL AND meaning != ''",
    )
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Words of `level` still missing a meaning, nickname or definition
pub async fn words_missing_meaning<'e, E>(executor: E, level: Level) -> Result<Vec<Word>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        SELECT {} FROM words
        WHERE level = ?
          AND (COALESCE(meaning, '') = ''
               OR COALESCE(nickname, '') = ''
               OR COALESCE(definition, '') = '')
        ORDER BY created_at ASC, rowid ASC
        "#,
        WORD_COLUMNS
    );

    let rows = sqlx::query(&sql).bind(level.as_str()).fetch_all(executor).await?;
    rows.iter().map(Word::from_row).collect()
}
