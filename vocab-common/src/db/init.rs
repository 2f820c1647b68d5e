//! Database initialization
//!
//! Creates the database file and schema on first run. Every statement is
//! idempotent, so the server and the maintenance tools can both call
//! [`init_database`] against an existing file.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the drill tracker database
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Per-connection pragmas: every pooled connection enforces foreign keys
    // (records cascade with their word/session) and shares the WAL journal
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (tests and dry runs)
///
/// A single connection is used so every query sees the same memory database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Begin a transaction that holds the write lock from its first statement
///
/// A deferred `BEGIN` that reads before writing cannot upgrade its lock while
/// another connection writes; SQLite fails it with `database is locked`
/// instead of waiting. `BEGIN IMMEDIATE` queues behind the busy timeout.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Create all tables and indexes, then run pending migrations
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_words_table(pool).await?;
    create_sessions_table(pool).await?;
    create_records_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the words table
///
/// `nickname` and `definition` arrive with migration v2.
pub async fn create_words_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            guid TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            alphabet TEXT,
            level TEXT NOT NULL DEFAULT 'one' CHECK (level IN ('one', 'two', 'three')),
            priority INTEGER NOT NULL DEFAULT 0 CHECK (priority BETWEEN 0 AND 2),
            bookmarked INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            meaning TEXT,
            source TEXT NOT NULL DEFAULT 'manual',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_words_text ON words(text)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_words_created ON words(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the sessions table
///
/// The partial unique index keeps at most one `open` session.
pub async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            guid TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            date TEXT NOT NULL,
            sequence INTEGER NOT NULL CHECK (sequence >= 1),
            status TEXT NOT NULL CHECK (status IN ('open', 'posted')),
            created_at TEXT NOT NULL,
            UNIQUE (date, sequence)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_single_open ON sessions(status) WHERE status = 'open'",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the records table
///
/// One record per (word, session); records go away with their word or session.
pub async fn create_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            guid TEXT PRIMARY KEY,
            word_id TEXT NOT NULL REFERENCES words(guid) ON DELETE CASCADE,
            session_id TEXT NOT NULL REFERENCES sessions(guid) ON DELETE CASCADE,
            result TEXT NOT NULL CHECK (result IN ('success', 'fail')),
            created_at TEXT NOT NULL,
            UNIQUE (word_id, session_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_session ON records(session_id)")
        .execute(pool)
        .await?;

    Ok(())
}
