//! # Vocab Common Library
//!
//! Shared code for the vocabulary drill tracker:
//! - Database models and schema initialization
//! - Configuration loading and root folder resolution
//! - Common error type
//! - Date and id helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
