//! Document Identifiers
//!
//! Identifiers are MongoDB ObjectIds in their 24-character hex form, stored
//! as string `_id` values so they serialize identically to JSON and BSON.

use bson::oid::ObjectId;

/// Length of an ObjectId rendered as hex
pub const OBJECT_ID_HEX_LEN: usize = 24;

/// Generator for new document identifiers
pub struct IdGenerator;

impl IdGenerator {
    /// Generate a new identifier, e.g. "665f1c2e9b1d8a4f3c2e1a0b"
    pub fn generate() -> String {
        ObjectId::new().to_hex()
    }
}

/// Whether `value` is a well-formed identifier (24 hex characters).
pub fn is_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_HEX_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}
