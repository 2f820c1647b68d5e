//! Bulk word import
//!
//! Input is one word per line: `ALPHABET | word | level`, e.g.
//!
//! ```text
//! A | abaft | one bee
//! B | badger | two bee
//! ```
//!
//! Level fields starting with `one`/`two` map to those levels, anything else
//! is `three`. Words already stored (or repeated within the batch) are skipped.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};
use vocab_common::db::{begin_write, Level, Word};
use vocab_common::{time, uuid_utils, Result};

use crate::db::words;

/// `source` tag for bulk-imported words
pub const BULK_SOURCE: &str = "bulk";

/// One parsed bulk line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEntry {
    pub alphabet: String,
    pub text: String,
    pub level: Level,
}

/// Parsed bulk input
#[derive(Debug, Default)]
pub struct BulkParse {
    pub entries: Vec<BulkEntry>,
    /// Non-blank lines without an alphabet, word and level field
    pub malformed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Parse bulk text; blank lines are ignored
pub fn parse_bulk(text: &str) -> BulkParse {
    let mut parsed = BulkParse::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        match fields.as_slice() {
            [alphabet, word, level, ..] if !word.is_empty() => {
                parsed.entries.push(BulkEntry {
                    alphabet: alphabet.to_uppercase(),
                    text: word.to_lowercase(),
                    level: Level::from_prefix(level),
                });
            }
            _ => parsed.malformed += 1,
        }
    }

    parsed
}

/// Import bulk text, skipping malformed lines and duplicates
pub async fn import_bulk(pool: &SqlitePool, text: &str) -> Result<BulkSummary> {
    let parsed = parse_bulk(text);
    if parsed.malformed > 0 {
        warn!("Bulk import: skipping {} malformed line(s)", parsed.malformed);
    }

    let mut tx = begin_write(pool).await?;

    let texts: Vec<String> = parsed.entries.iter().map(|e| e.text.clone()).collect();
    let mut seen = words::existing_texts(&mut *tx, &texts).await?;

    let now = time::now_rfc3339();
    let mut inserted = 0;
    for entry in &parsed.entries {
        // insert() is false for stored texts and in-batch repeats alike
        if !seen.insert(entry.text.clone()) {
            continue;
        }

        let word = Word {
            id: uuid_utils::generate_string(),
            text: entry.text.clone(),
            alphabet: Some(entry.alphabet.clone()).filter(|a| !a.is_empty()),
            level: entry.level,
            priority: 0,
            bookmarked: false,
            active: true,
            meaning: None,
            nickname: None,
            definition: None,
            source: BULK_SOURCE.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        words::insert_word(&mut *tx, &word).await?;
        inserted += 1;
    }

    tx.commit().await?;

    let summary = BulkSummary {
        inserted,
        skipped: parsed.entries.len() + parsed.malformed - inserted,
    };
    info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        "Bulk import finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_lines() {
        let parsed = parse_bulk("a | Abaft | one bee\nB|badger|Two Bee\n\n  c | cactus | three\n");
        assert_eq!(parsed.malformed, 0);
        assert_eq!(
            parsed.entries,
            vec![
                BulkEntry { alphabet: "A".into(), text: "abaft".into(), level: Level::One },
                BulkEntry { alphabet: "B".into(), text: "badger".into(), level: Level::Two },
                BulkEntry { alphabet: "C".into(), text: "cactus".into(), level: Level::Three },
            ]
        );
    }

    #[test]
    fn test_parse_counts_malformed_lines() {
        let parsed = parse_bulk("just-a-word\nA | | one\nA | apple | one");
        assert_eq!(parsed.malformed, 2);
        assert_eq!(parsed.entries.len(), 1);
    }

    #[test]
    fn test_unknown_level_is_three() {
        let parsed = parse_bulk("Z | zebra | hard");
        assert_eq!(parsed.entries[0].level, Level::Three);
    }

    #[test]
    fn test_windows_line_endings() {
        let parsed = parse_bulk("A | apple | one\r\nB | bear | two\r\n");
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[1].text, "bear");
    }
}
