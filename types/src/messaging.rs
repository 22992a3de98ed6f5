//! Contact, chat and relay records.
//!
//! Field names on the wire follow the stored JSON format (`out`, `time`), which
//! is shorter than the Rust names.

use serde::{Deserialize, Serialize};

use crate::{ContactId, ContactToken, RelayEntryId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub token: ContactToken,
}

/// A single chat line, owned by exactly one contact's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(rename = "out")]
    pub outbound: bool,
    /// Unix milliseconds.
    #[serde(rename = "time")]
    pub timestamp: i64,
}

/// An entry in the simulated relay inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEntry {
    pub id: RelayEntryId,
    /// Unix milliseconds.
    #[serde(rename = "time")]
    pub timestamp: i64,
    pub payload: serde_json::Value,
}
