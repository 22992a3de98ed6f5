//! Contacts, chat and the simulated relay through the App facade.

use std::collections::HashSet;

use serde_json::json;

use gate_engine::{ContactId, RELAY_QUEUED_MESSAGE};

use crate::common::{log_messages, memory_app};

#[test]
fn add_contact_grows_by_exactly_one() {
    let mut app = memory_app();
    assert!(app.add_contact("").is_none());
    assert!(app.contacts().is_empty());

    let mut ids = HashSet::new();
    for name in ["Ana", "Ana", "Bo"] {
        let before = app.contacts().len();
        let id = app.add_contact(name).expect("added");
        assert_eq!(app.contacts().len(), before + 1);
        assert!(ids.insert(id), "duplicate id");
    }
    assert_eq!(
        log_messages(&app),
        vec!["Contact added: Ana", "Contact added: Ana", "Contact added: Bo"]
    );
}

#[test]
fn chat_to_missing_contact_changes_nothing() {
    let mut app = memory_app();
    let ana = app.add_contact("Ana").expect("added");
    app.send_message(&ana, "hello");
    let history_before = app.contacts().history(&ana).to_vec();
    let log_before = app.log().len();

    let ghost = ContactId::new("C-missing");
    assert!(!app.send_message(&ghost, "hello?"));
    assert!(!app.send_message(&ana, ""));

    assert_eq!(app.contacts().history(&ana), history_before.as_slice());
    assert!(app.contacts().history(&ghost).is_empty());
    assert_eq!(app.log().len(), log_before);
}

#[test]
fn chat_messages_are_outbound_and_timestamped() {
    let mut app = memory_app();
    let ana = app.add_contact("Ana").expect("added");
    app.send_message(&ana, "first");
    app.send_message(&ana, "second");

    let history = app.contacts().history(&ana);
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|m| m.outbound));
    assert!(history[0].timestamp <= history[1].timestamp);
    assert!(history[0].timestamp > 0);
    assert_eq!(
        app.log().latest().map(|e| e.message().to_string()),
        Some(format!("Sent chat to {ana}: second"))
    );
}

#[test]
fn relay_queues_locally_and_reports_length() {
    let mut app = memory_app();
    app.send_to_relay("one");
    app.queue_relay_payload(json!({"kind": "ping"}));

    let inbox = app.read_relay_inbox();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].payload, json!({"kind": "ping"}));
    assert_eq!(inbox[1].payload, json!({"from": "unknown", "text": "one"}));
    assert_eq!(app.notice(), Some("Relay inbox length: 2"));

    let queued = log_messages(&app)
        .iter()
        .filter(|m| *m == RELAY_QUEUED_MESSAGE)
        .count();
    assert_eq!(queued, 2);
}

#[test]
fn relay_inbox_is_scoped_to_destination() {
    let mut app = memory_app();
    let entry = app.send_to_relay("hello").expect("queued");
    assert!(app.relay().inbox_key().ends_with(app.relay().destination()));
    assert!(entry.id.as_str().starts_with("m-"));
}
