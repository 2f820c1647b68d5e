//! Database access layer for the drill tracker
//!
//! Query functions take any SQLite executor so they run the same against
//! the pool or inside a transaction (`&mut *tx`).

pub mod records;
pub mod sessions;
pub mod stats;
pub mod words;

pub use stats::word_stats;
