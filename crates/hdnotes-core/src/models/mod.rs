//! Data models for HD Notes API responses.
//!
//! Wire types mirror the JSON the notes API returns (camelCase field names).
//! Fields the client does not interpret are carried through untouched.

pub mod note;
pub mod user;

pub use note::{Note, NoteDraft, NoteMeta, NotePage, NoteQuery, NoteStats, DEFAULT_PAGE_SIZE};
pub use user::{AuthGrant, OtpAck, User};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Ids arrive as strings from some backends and as integers from others.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for id, got {}",
            other
        ))),
    }
}
