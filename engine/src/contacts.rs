//! Contact list and per-contact chat histories, written through on every change.
//!
//! The two collections live under separate keys. A failure between the two
//! writes can leave them out of step; nothing here tries to reconcile that.

use std::collections::BTreeMap;

use gate_types::{ChatMessage, Contact, ContactId, ContactToken, NonEmptyString};

use crate::storage::{
    CHAT_HISTORIES_KEY, CONTACT_LIST_KEY, KvStore, StoreError, load_json, save_json,
};
use crate::util::random_base36;

const CONTACT_TOKEN_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    contacts: Vec<Contact>,
    chats: BTreeMap<ContactId, Vec<ChatMessage>>,
}

impl ContactBook {
    /// Load both collections, failing on the first unreadable one.
    pub fn load(store: &dyn KvStore) -> Result<Self, StoreError> {
        let contacts = load_json(store, CONTACT_LIST_KEY)?.unwrap_or_default();
        let chats = load_json(store, CHAT_HISTORIES_KEY)?.unwrap_or_default();
        Ok(Self { contacts, chats })
    }

    /// Load each collection independently; an unreadable one starts empty.
    pub fn load_or_default(store: &dyn KvStore) -> Self {
        let contacts = load_json(store, CONTACT_LIST_KEY).unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored contacts: {e}");
            None
        });
        let chats = load_json(store, CHAT_HISTORIES_KEY).unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored chat histories: {e}");
            None
        });
        Self {
            contacts: contacts.unwrap_or_default(),
            chats: chats.unwrap_or_default(),
        }
    }

    /// Insertion order.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    #[must_use]
    pub fn contact(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ContactId) -> bool {
        self.contact(id).is_some()
    }

    /// Oldest first. Unknown ids have an empty history.
    #[must_use]
    pub fn history(&self, id: &ContactId) -> &[ChatMessage] {
        self.chats.get(id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Append a contact with a fresh id. Blank names are ignored.
    pub fn add_contact(&mut self, store: &mut dyn KvStore, name: &str) -> Option<Contact> {
        let name = NonEmptyString::new(name).ok()?;
        let contact = Contact {
            id: self.fresh_id(),
            name: name.into_inner(),
            token: ContactToken::new(format!("CT-{}", random_base36(CONTACT_TOKEN_LEN))),
        };
        self.contacts.push(contact.clone());
        write_through(store, CONTACT_LIST_KEY, &self.contacts);
        Some(contact)
    }

    /// Append an outbound message. Unknown ids and blank text are ignored.
    pub fn send_message(
        &mut self,
        store: &mut dyn KvStore,
        id: &ContactId,
        text: &str,
        timestamp: i64,
    ) -> Option<ChatMessage> {
        if !self.contains(id) {
            return None;
        }
        let text = NonEmptyString::new(text).ok()?;
        let message = ChatMessage {
            text: text.into_inner(),
            outbound: true,
            timestamp,
        };
        self.chats
            .entry(id.clone())
            .or_default()
            .push(message.clone());
        write_through(store, CHAT_HISTORIES_KEY, &self.chats);
        Some(message)
    }

    fn fresh_id(&self) -> ContactId {
        loop {
            let id = ContactId::new(format!("C-{}", uuid::Uuid::new_v4().simple()));
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

/// Persist `value`, keeping in-memory state authoritative if the write fails.
fn write_through<T: serde::Serialize + ?Sized>(store: &mut dyn KvStore, key: &str, value: &T) {
    if let Err(e) = save_json(store, key, value) {
        tracing::warn!("Failed to persist {key}: {e}");
    }
}
