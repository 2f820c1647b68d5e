//! Table view rendering
//!
//! Turns a [`TablePayload`] plus the user's filter/sort/page state into the
//! rows and columns the browser draws. Pure and recomputed on every request,
//! so every mutation is followed by a fresh render.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use vocab_common::db::{Level, RecordResult, SessionStatus, Word, WordStats};

use crate::pagination::{calculate_pagination, clamp_page_size};
use crate::table::TablePayload;

/// Sort key for word rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Creation order
    #[default]
    Created,
    Text,
    Priority,
    /// Success ratio
    Rate,
    Attempts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter, sort and page state
#[derive(Debug, Clone, Deserialize)]
pub struct ViewQuery {
    pub level: Option<Level>,
    /// Alphabet group, case-insensitive
    pub alphabet: Option<String>,
    /// Minimum priority
    pub priority: Option<i64>,
    /// Only bookmarked words
    #[serde(default)]
    pub bookmarked: bool,
    /// Substring of the word text, case-insensitive
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default = "default_page")]
    pub page: i64,
    pub page_size: Option<i64>,
    /// Number of session columns to show, newest first
    pub sessions: Option<usize>,
}

fn default_page() -> i64 {
    1
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            level: None,
            alphabet: None,
            priority: None,
            bookmarked: false,
            search: None,
            sort: SortKey::default(),
            order: SortOrder::default(),
            page: default_page(),
            page_size: None,
            sessions: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewColumn {
    pub session_id: String,
    pub label: String,
    pub status: SessionStatus,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewCell {
    pub session_id: String,
    pub mark: Option<RecordResult>,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    pub word_id: String,
    pub text: String,
    pub alphabet: Option<String>,
    pub level: Level,
    pub priority: i64,
    pub bookmarked: bool,
    pub meaning: Option<String>,
    pub success: i64,
    pub attempts: i64,
    pub rate: f64,
    pub cells: Vec<ViewCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// Rows matching the filters, across all pages
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub columns: Vec<ViewColumn>,
    pub rows: Vec<ViewRow>,
}

impl ViewQuery {
    fn matches(&self, word: &Word) -> bool {
        if let Some(level) = self.level {
            if word.level != level {
                return false;
            }
        }

        if let Some(alphabet) = self.alphabet.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            match &word.alphabet {
                Some(a) if a.eq_ignore_ascii_case(alphabet) => {}
                _ => return false,
            }
        }

        if let Some(min) = self.priority {
            if word.priority < min {
                return false;
            }
        }

        if self.bookmarked && !word.bookmarked {
            return false;
        }

        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !word.text.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }

        true
    }

    fn compare(&self, a: (&Word, WordStats), b: (&Word, WordStats)) -> Ordering {
        let (wa, sa) = a;
        let (wb, sb) = b;
        match self.sort {
            SortKey::Created => Ordering::Equal,
            SortKey::Text => wa.text.cmp(&wb.text),
            SortKey::Priority => wa.priority.cmp(&wb.priority),
            SortKey::Rate => sa.rate().total_cmp(&sb.rate()),
            SortKey::Attempts => sa.attempts.cmp(&sb.attempts),
        }
    }
}

/// Compute the table view for `query`
pub fn render_view(payload: &TablePayload, query: &ViewQuery) -> TableView {
    // Words arrive in creation order; the index is the tie-breaker
    let mut matching: Vec<(usize, &Word, WordStats)> = payload
        .words
        .iter()
        .enumerate()
        .filter(|(_, w)| query.matches(w))
        .map(|(i, w)| (i, w, payload.stats_for(&w.id)))
        .collect();

    matching.sort_by(|a, b| {
        let key = query.compare((a.1, a.2), (b.1, b.2));
        let key = match query.order {
            SortOrder::Asc => key,
            SortOrder::Desc => key.reverse(),
        };
        let created = match (query.sort, query.order) {
            (SortKey::Created, SortOrder::Desc) => b.0.cmp(&a.0),
            _ => a.0.cmp(&b.0),
        };
        key.then(created)
    });

    let total_rows = matching.len() as i64;
    let p = calculate_pagination(total_rows, query.page, clamp_page_size(query.page_size));

    let shown_sessions = query.sessions.unwrap_or(payload.sessions.len());
    let columns: Vec<ViewColumn> = payload
        .sessions
        .iter()
        .take(shown_sessions)
        .map(|s| ViewColumn {
            session_id: s.id.clone(),
            label: s.label.clone(),
            status: s.status,
            editable: s.is_open(),
        })
        .collect();

    let marks: HashMap<(&str, &str), RecordResult> = payload
        .records
        .iter()
        .map(|r| ((r.word_id.as_str(), r.session_id.as_str()), r.result))
        .collect();

    let rows = matching
        .into_iter()
        .skip(p.offset as usize)
        .take(p.page_size as usize)
        .map(|(_, word, stats)| ViewRow {
            word_id: word.id.clone(),
            text: word.text.clone(),
            alphabet: word.alphabet.clone(),
            level: word.level,
            priority: word.priority,
            bookmarked: word.bookmarked,
            meaning: word.cached_meaning().map(str::to_string),
            success: stats.success,
            attempts: stats.attempts,
            rate: stats.rate(),
            cells: columns
                .iter()
                .map(|c| ViewCell {
                    session_id: c.session_id.clone(),
                    mark: marks
                        .get(&(word.id.as_str(), c.session_id.as_str()))
                        .copied(),
                    editable: c.editable,
                })
                .collect(),
        })
        .collect();

    TableView {
        total_rows,
        page: p.page,
        page_size: p.page_size,
        total_pages: p.total_pages,
        columns,
        rows,
    }
}
