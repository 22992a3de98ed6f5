//! Access controller behaviour driven through the App facade.

use std::time::{Duration, Instant};

use gate_engine::{App, AuthState, MemoryStore, PortalState};

use crate::common::{
    ACTIVATION_DELAY, LONG_KEY, SHORT_KEY, config_with_delay, log_messages, memory_app,
};

fn assert_fully_reset(app: &App) {
    let access = app.access();
    assert_eq!(access.portal(), PortalState::CLOSED);
    assert!(!access.preconditions().standing);
    assert!(!access.preconditions().spoken_word);
    assert_eq!(access.auth_state(), AuthState::Idle);
}

#[test]
fn full_activation_scenario_logs_in_order() {
    let start = Instant::now();
    let mut app = memory_app();

    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    assert!(app.access().portal().spinning);
    assert!(!app.access().portal().open);

    app.tick_at(start + ACTIVATION_DELAY);
    assert!(app.access().portal().open);

    assert_eq!(
        log_messages(&app),
        vec![
            "Authorized key detected",
            "Traveller stood on Mars Plate",
            "Activation word \"agt\" spoken",
            "Authorization verified. Charging magnet, diamond ring engaging",
            "Portal open. Transit funnel stable (simulation), ready for transit",
        ]
    );
}

#[test]
fn long_key_is_accepted() {
    let mut app = memory_app();
    app.present_credential(LONG_KEY);
    assert_eq!(app.access().auth_state(), AuthState::Authorized);
}

#[test]
fn portal_never_opens_before_delay() {
    let start = Instant::now();
    let mut app = memory_app();
    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);

    for ms in [0, 1, 450, 899] {
        app.tick_at(start + Duration::from_millis(ms));
        assert!(!app.access().portal().open, "opened early at {ms}ms");
    }
    app.tick_at(start + ACTIVATION_DELAY);
    assert!(app.access().portal().open);
}

#[test]
fn reset_during_delay_keeps_portal_closed() {
    let start = Instant::now();
    let mut app = memory_app();
    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);

    app.tick_at(start + Duration::from_millis(300));
    app.reset();
    app.tick_at(start + Duration::from_secs(5));

    assert_fully_reset(&app);
    let messages = log_messages(&app);
    assert_eq!(
        messages.last().map(String::as_str),
        Some("Safety eject executed: portal closed, travellers removed")
    );
    assert!(!messages.iter().any(|m| m.starts_with("Portal open")));
}

#[test]
fn second_attempt_supersedes_first() {
    let start = Instant::now();
    let mut app = App::new(&config_with_delay(100), Box::new(MemoryStore::new()));
    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    app.attempt_activation_at(start + Duration::from_millis(50));

    app.tick_at(start + Duration::from_millis(100));
    assert!(!app.access().portal().open);

    app.tick_at(start + Duration::from_millis(150));
    assert!(app.access().portal().open);
    let opened = log_messages(&app)
        .iter()
        .filter(|m| m.starts_with("Portal open"))
        .count();
    assert_eq!(opened, 1);
}

#[test]
fn guards_report_first_unmet_condition() {
    let now = Instant::now();
    let mut app = memory_app();

    app.attempt_activation_at(now);
    app.present_credential(SHORT_KEY);
    app.attempt_activation_at(now);
    app.set_standing(true);
    app.attempt_activation_at(now);

    let messages = log_messages(&app);
    assert_eq!(messages[0], "Activation failed: correct magnetic key required");
    assert_eq!(messages[2], "Activation failed: no traveller on Mars Plate");
    assert_eq!(
        messages[4],
        "Activation failed: activation word \"agt\" not detected"
    );
    assert_eq!(app.access().portal(), PortalState::CLOSED);
}

#[test]
fn standing_false_denial_preserves_auth_state() {
    let now = Instant::now();
    for key in [None, Some(SHORT_KEY), Some("intruder")] {
        let mut app = memory_app();
        if let Some(key) = key {
            app.present_credential(key);
        }
        app.speak_activation_word();
        let before = app.access().auth_state();
        app.attempt_activation_at(now);
        assert_eq!(app.access().auth_state(), before);
        assert!(!app.access().portal().spinning);
    }
}

#[test]
fn unauthorized_key_only_clears_portal() {
    let start = Instant::now();
    let mut app = memory_app();
    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    app.tick_at(start + ACTIVATION_DELAY);
    assert!(app.access().portal().open);

    app.present_credential("not-the-key");

    let access = app.access();
    assert_eq!(access.auth_state(), AuthState::Unauthorized);
    assert_eq!(access.portal(), PortalState::CLOSED);
    assert!(access.preconditions().standing);
    assert!(access.preconditions().spoken_word);
    assert_eq!(
        app.log().latest().map(|e| e.message()),
        Some("Unauthorized key: field disruption")
    );
}

#[test]
fn unauthorized_key_during_delay_cancels_open() {
    let start = Instant::now();
    let mut app = memory_app();
    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    app.present_credential("not-the-key");
    app.tick_at(start + ACTIVATION_DELAY);
    assert!(!app.access().portal().open);
}

#[test]
fn reset_is_idempotent_from_any_state() {
    let start = Instant::now();
    let mut app = memory_app();
    app.reset();
    assert_fully_reset(&app);

    app.present_credential(SHORT_KEY);
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    app.tick_at(start + ACTIVATION_DELAY);
    app.reset();
    app.reset();
    assert_fully_reset(&app);
}

#[test]
fn presented_key_survives_reset() {
    let start = Instant::now();
    let mut app = memory_app();
    app.present_credential(SHORT_KEY);
    app.reset();
    app.set_standing(true);
    app.speak_activation_word();
    app.attempt_activation_at(start);
    assert!(app.access().portal().spinning);
    assert_eq!(app.access().auth_state(), AuthState::Authorized);
}

#[test]
fn log_is_capped_at_default_capacity() {
    let mut app = memory_app();
    app.rotate_left();
    for _ in 0..200 {
        app.rotate_right();
    }
    assert_eq!(app.log().len(), 200);
    assert!(
        log_messages(&app)
            .iter()
            .all(|m| m == "Rotated gate right")
    );
    assert_eq!(app.orientation().degrees(), (199 * 10 % 360) as u16);
}
