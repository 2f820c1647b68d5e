//! Row id helpers
//!
//! Ids are random UUIDv4 values stored as hyphenated TEXT.

use uuid::Uuid;

/// Fresh id for a new row
pub fn generate_string() -> String {
    Uuid::new_v4().to_string()
}
