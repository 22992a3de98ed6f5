//! Simulated outbound relay.
//!
//! Nothing here reaches a network. "Sending" appends an entry to a local inbox
//! stored under the destination's key, and reading returns that inbox. The
//! destination is an opaque string from configuration.

use serde_json::Value;

use gate_types::{RelayEntry, RelayEntryId};

use crate::storage::{KvStore, RELAY_INBOX_KEY_PREFIX, StoreError, load_json, save_json};
use crate::util::random_base36;

const RELAY_ENTRY_ID_LEN: usize = 7;

/// Log line for a queued relay payload. The relay never delivers.
pub const RELAY_QUEUED_MESSAGE: &str =
    "Message queued for relay destination (simulated, not delivered)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    destination: String,
}

impl Relay {
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn inbox_key(&self) -> String {
        format!("{RELAY_INBOX_KEY_PREFIX}{}", self.destination)
    }

    /// Prepend `payload` to the local inbox (newest first) and persist it.
    ///
    /// An unreadable stored inbox fails the send and is left untouched.
    pub fn send(
        &self,
        store: &mut dyn KvStore,
        payload: Value,
        timestamp: i64,
    ) -> Result<RelayEntry, StoreError> {
        let key = self.inbox_key();
        let mut inbox = self.read_inbox(store)?;
        let entry = RelayEntry {
            id: RelayEntryId::new(format!("m-{}", random_base36(RELAY_ENTRY_ID_LEN))),
            timestamp,
            payload,
        };
        inbox.insert(0, entry.clone());
        save_json(store, &key, &inbox)?;
        Ok(entry)
    }

    /// Stored inbox, newest first. Missing inbox reads as empty.
    pub fn read_inbox(&self, store: &dyn KvStore) -> Result<Vec<RelayEntry>, StoreError> {
        Ok(load_json(store, &self.inbox_key())?.unwrap_or_default())
    }
}
