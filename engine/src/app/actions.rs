//! User actions. Each one appends at most one Event Log entry.

use std::time::Instant;

use serde_json::{Value, json};

use gate_types::{ContactId, Credential, RelayEntry};

use super::App;
use crate::relay::RELAY_QUEUED_MESSAGE;
use crate::util::now_millis;

pub const RELAY_FAILED_MESSAGE: &str = "Relay queue failed: storage unavailable";

impl App {
    pub fn present_credential(&mut self, value: &str) {
        let event = self.access.present_credential(Credential::new(value));
        self.log.append(event.to_string());
    }

    /// Forget the presented key and empty the key field.
    pub fn clear_credential(&mut self) {
        self.ui.drafts.credential.clear();
        let event = self.access.clear_credential();
        self.log.append(event.to_string());
    }

    pub fn toggle_standing(&mut self) {
        let event = self.access.toggle_standing();
        self.log.append(event.to_string());
    }

    pub fn set_standing(&mut self, standing: bool) {
        let event = self.access.set_standing(standing);
        self.log.append(event.to_string());
    }

    pub fn speak_activation_word(&mut self) {
        let event = self.access.speak_activation_word();
        self.log.append(event.to_string());
    }

    pub fn attempt_activation(&mut self) {
        self.attempt_activation_at(Instant::now());
    }

    /// On success the portal spins now and opens on the first tick at or
    /// after the configured delay.
    pub fn attempt_activation_at(&mut self, now: Instant) {
        let outcome = self.access.attempt_activation(now);
        self.log.append(outcome.event().to_string());
        if let Some(ticket) = outcome.ticket() {
            self.pending.schedule(ticket);
        }
    }

    pub fn reset(&mut self) {
        let event = self.access.reset();
        self.log.append(event.to_string());
    }

    pub fn rotate_left(&mut self) {
        let event = self.orientation.rotate_left();
        self.log.append(event.to_string());
    }

    pub fn rotate_right(&mut self) {
        let event = self.orientation.rotate_right();
        self.log.append(event.to_string());
    }

    pub fn snap_north(&mut self) {
        let event = self.orientation.snap_north();
        self.log.append(event.to_string());
    }

    /// Blank names are ignored.
    pub fn add_contact(&mut self, name: &str) -> Option<ContactId> {
        let contact = self.contacts.add_contact(self.store.as_mut(), name)?;
        self.log.append(format!("Contact added: {}", contact.name));
        Some(contact.id)
    }

    /// Show `id`'s chat. The id does not have to name a known contact.
    pub fn select_contact(&mut self, id: ContactId) {
        if let Some(index) = self.contacts.contacts().iter().position(|c| c.id == id) {
            self.ui.contact_cursor = index;
        }
        self.ui.selected_contact = Some(id);
    }

    /// Unknown ids and blank text are ignored.
    pub fn send_message(&mut self, id: &ContactId, text: &str) -> bool {
        let Some(message) = self
            .contacts
            .send_message(self.store.as_mut(), id, text, now_millis())
        else {
            return false;
        };
        self.log
            .append(format!("Sent chat to {id}: {}", message.text));
        true
    }

    /// Queue `text` for the relay, tagged with the selected contact.
    ///
    /// The relay is simulated: the payload lands in a local inbox and is never
    /// delivered anywhere.
    pub fn send_to_relay(&mut self, text: &str) -> Option<RelayEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let from = self
            .ui
            .selected_contact
            .as_ref()
            .map_or("unknown", ContactId::as_str);
        let payload = json!({ "from": from, "text": text });
        self.queue_relay_payload(payload)
    }

    /// Queue an arbitrary JSON payload for the simulated relay.
    pub fn queue_relay_payload(&mut self, payload: Value) -> Option<RelayEntry> {
        match self.relay.send(self.store.as_mut(), payload, now_millis()) {
            Ok(entry) => {
                self.log.append(RELAY_QUEUED_MESSAGE);
                Some(entry)
            }
            Err(e) => {
                tracing::warn!("Failed to queue relay payload: {e}");
                self.log.append(RELAY_FAILED_MESSAGE);
                None
            }
        }
    }

    /// Read the local relay inbox (newest first) and raise a notice with its length.
    pub fn read_relay_inbox(&mut self) -> Vec<RelayEntry> {
        let inbox = self
            .relay
            .read_inbox(self.store.as_ref())
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read relay inbox: {e}");
                Vec::new()
            });
        self.ui.notice = Some(format!("Relay inbox length: {}", inbox.len()));
        inbox
    }
}
