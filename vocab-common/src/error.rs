//! Error type shared by the server and the maintenance tool

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable or malformed TOML config
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied value rejected (maps to 400 in the API)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data that does not parse back (corrupt enum column)
    #[error("Internal error: {0}")]
    Internal(String),
}
