//! Table aggregation
//!
//! Joins active words, sessions, records and per-word stats into the single
//! payload the table view is computed from.

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use vocab_common::db::{Record, Session, Word, WordStats};
use vocab_common::Result;

use crate::db::{records, sessions, word_stats, words};

/// Raw collections behind the table
#[derive(Debug, Clone, Default, Serialize)]
pub struct TablePayload {
    /// Active words in creation order
    pub words: Vec<Word>,
    /// Sessions, newest first
    pub sessions: Vec<Session>,
    pub records: Vec<Record>,
    pub stats_by_word: BTreeMap<String, WordStats>,
}

impl TablePayload {
    /// Stats for a word, zero when it has no records
    pub fn stats_for(&self, word_id: &str) -> WordStats {
        self.stats_by_word.get(word_id).copied().unwrap_or_default()
    }
}

/// Load the table payload from one read transaction
pub async fn load_table(pool: &SqlitePool) -> Result<TablePayload> {
    let mut tx = pool.begin().await?;

    let payload = TablePayload {
        words: words::list_words(&mut *tx, true).await?,
        sessions: sessions::list_sessions(&mut *tx).await?,
        records: records::list_records(&mut *tx).await?,
        stats_by_word: word_stats(&mut *tx).await?,
    };

    tx.commit().await?;

    Ok(payload)
}
