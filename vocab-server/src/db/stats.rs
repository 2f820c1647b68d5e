//! Per-word success/attempt aggregation

use sqlx::{Executor, Row, Sqlite};
use std::collections::BTreeMap;
use vocab_common::db::WordStats;
use vocab_common::Result;

/// `word_id -> {success, attempts}` over every record
///
/// Words without records are absent from the map.
pub async fn word_stats<'e, E>(executor: E) -> Result<BTreeMap<String, WordStats>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        r#"
        SELECT word_id,
               SUM(CASE WHEN result = 'success' THEN 1 ELSE 0 END) AS success,
               COUNT(*) AS attempts
        FROM records
        GROUP BY word_id
        "#,
    )
    .fetch_all(executor)
    .await?;

    let mut out = BTreeMap::new();
    for row in rows {
        out.insert(
            row.try_get::<String, _>("word_id")?,
            WordStats {
                success: row.try_get("success")?,
                attempts: row.try_get("attempts")?,
            },
        );
    }

    Ok(out)
}
