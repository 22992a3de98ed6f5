//! File-backed round trips across App instances.

use gate_engine::{App, CONTACT_LIST_KEY, FileStore, KvStore, load_json};
use gate_types::Contact;
use tempfile::tempdir;

use crate::common::{config_with_storage, file_app};

#[test]
fn contacts_chats_and_inbox_survive_restart() {
    let dir = tempdir().expect("tempdir");

    let (ana, bo, share_token) = {
        let mut app = file_app(dir.path());
        let ana = app.add_contact("Ana").expect("added");
        let bo = app.add_contact("Bo").expect("added");
        app.send_message(&ana, "one");
        app.send_message(&bo, "other");
        app.send_message(&ana, "two");
        app.select_contact(ana.clone());
        app.send_to_relay("first");
        app.send_to_relay("second");
        (ana, bo, app.share_token().clone())
    };

    let mut app = file_app(dir.path());
    let names: Vec<_> = app
        .contacts()
        .contacts()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Ana", "Bo"]);
    assert_eq!(app.contacts().contacts()[0].id, ana);

    let texts: Vec<_> = app
        .contacts()
        .history(&ana)
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(app.contacts().history(&bo).len(), 1);

    let inbox = app.read_relay_inbox();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].payload["text"], "second");
    assert_eq!(inbox[1].payload["text"], "first");
    assert_eq!(inbox[0].payload["from"], ana.as_str());

    assert_eq!(app.share_token(), &share_token);
}

#[test]
fn share_token_is_stable_and_well_formed() {
    let dir = tempdir().expect("tempdir");
    let first = file_app(dir.path()).share_token().clone();
    let second = file_app(dir.path()).share_token().clone();
    assert_eq!(first, second);
    assert!(first.as_str().starts_with("SHARE-"));
}

#[test]
fn stored_contact_list_uses_plain_json_records() {
    let dir = tempdir().expect("tempdir");
    let mut app = file_app(dir.path());
    let id = app.add_contact("Ana").expect("added");

    let store = FileStore::open(dir.path()).expect("open");
    let raw = store.get(CONTACT_LIST_KEY).expect("get").expect("present");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value[0]["id"], id.as_str());
    assert_eq!(value[0]["name"], "Ana");
    assert!(value[0]["token"].as_str().is_some_and(|t| t.starts_with("CT-")));

    let contacts: Vec<Contact> = load_json(&store, CONTACT_LIST_KEY)
        .expect("load")
        .expect("present");
    assert_eq!(contacts.len(), 1);
}

#[test]
fn corrupt_contact_file_starts_empty() {
    let dir = tempdir().expect("tempdir");
    let mut store = FileStore::open(dir.path()).expect("open");
    store.set(CONTACT_LIST_KEY, "{broken").expect("set");

    let app = file_app(dir.path());
    assert!(app.contacts().is_empty());
}

#[test]
fn open_uses_configured_storage_dir() {
    let dir = tempdir().expect("tempdir");
    let data = dir.path().join("gate-data");
    // GATE_DATA_DIR would take precedence; this test assumes it is unset.
    if std::env::var_os("GATE_DATA_DIR").is_some() {
        return;
    }

    let config = config_with_storage(&data);
    {
        let mut app = App::open(&config).expect("open");
        app.add_contact("Ana");
    }
    assert!(data.join("contact-list.json").exists());

    let app = App::open(&config).expect("reopen");
    assert_eq!(app.contacts().len(), 1);
}
