//! Statistics and table endpoints
//!
//! - `GET /stats/words` per-word success/attempt counts
//! - `GET /table` raw collections behind the table
//! - `GET /table/view` filtered, sorted and paged table

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use std::collections::BTreeMap;
use vocab_common::db::WordStats;

use crate::db::word_stats;
use crate::table::{load_table, TablePayload};
use crate::view::{render_view, TableView, ViewQuery};
use crate::{ApiResult, AppState};

/// GET /stats/words
pub async fn get_word_stats(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, WordStats>>> {
    Ok(Json(word_stats(&state.db).await?))
}

/// GET /table
pub async fn get_table(State(state): State<AppState>) -> ApiResult<Json<TablePayload>> {
    Ok(Json(load_table(&state.db).await?))
}

/// GET /table/view
pub async fn get_table_view(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> ApiResult<Json<TableView>> {
    let Query(query) = query?;
    let payload = load_table(&state.db).await?;
    Ok(Json(render_view(&payload, &query)))
}

pub fn table_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/words", get(get_word_stats))
        .route("/table", get(get_table))
        .route("/table/view", get(get_table_view))
}
