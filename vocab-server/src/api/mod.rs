//! HTTP API handlers for the drill tracker

pub mod buildinfo;
pub mod health;
pub mod records;
pub mod sessions;
pub mod speech;
pub mod table;
pub mod translation;
pub mod ui;
pub mod words;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use records::record_routes;
pub use sessions::session_routes;
pub use speech::speech_routes;
pub use table::table_routes;
pub use translation::translation_routes;
pub use ui::ui_routes;
pub use words::word_routes;
