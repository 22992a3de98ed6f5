//! Input handling for the gate TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use gate_engine::{App, EditTarget, InputMode};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them over a bounded channel.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so a blocked send in the input thread returns.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take()
            && tokio::time::timeout(Duration::from_secs(2), join).await.is_err()
        {
            tracing::warn!("Input thread did not stop within 2s");
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending input into `app`. Returns `true` once the app wants to quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, &ev) {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

/// Apply one terminal event. Returns `true` once the app wants to quit.
pub fn apply_event(app: &mut App, ev: &Event) -> bool {
    let Event::Key(key) = ev else {
        return app.should_quit();
    };
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return app.should_quit();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.request_quit();
        return true;
    }

    match app.input_mode() {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing(_) => handle_edit_mode(app, key),
    }
    app.should_quit()
}

fn handle_normal_mode(app: &mut App, key: &KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.request_quit(),
        KeyCode::Esc => app.dismiss_notice(),
        KeyCode::Char('k') => app.begin_edit(EditTarget::Credential),
        KeyCode::Char('x') => app.clear_credential(),
        KeyCode::Char('s') => app.toggle_standing(),
        KeyCode::Char('w') => app.speak_activation_word(),
        KeyCode::Char('o') => app.attempt_activation(),
        KeyCode::Char('e') => app.reset(),
        KeyCode::Char('a') => app.begin_edit(EditTarget::NewContact),
        KeyCode::Char('m') => app.begin_edit(EditTarget::Chat),
        KeyCode::Char('r') => app.begin_edit(EditTarget::Relay),
        KeyCode::Char('i') => {
            app.read_relay_inbox();
        }
        KeyCode::Char('[') => app.rotate_left(),
        KeyCode::Char(']') => app.rotate_right(),
        KeyCode::Char('n') => app.snap_north(),
        KeyCode::Up => app.move_contact_cursor_up(),
        KeyCode::Down => app.move_contact_cursor_down(),
        KeyCode::Enter => app.open_contact_at_cursor(),
        _ => {}
    }
}

fn handle_edit_mode(app: &mut App, key: &KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.submit_edit(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use gate_engine::{App, AuthState, EditTarget, GateConfig, InputMode, MemoryStore};

    use super::apply_event;

    const DEFAULT_SHORT_KEY: &str = "davidgomadza";

    fn app() -> App {
        App::new(&GateConfig::default(), Box::new(MemoryStore::new()))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        apply_event(app, &Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn q_quits_only_in_normal_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.draft(EditTarget::NewContact).text(), "q");

        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn ctrl_c_quits_from_edit_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('k'));
        let quit = apply_event(
            &mut app,
            &Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert!(quit);
    }

    #[test]
    fn key_entry_and_activation_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.input_mode(), InputMode::Editing(EditTarget::Credential));
        type_str(&mut app, DEFAULT_SHORT_KEY);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.access().auth_state(), AuthState::Authorized);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('w'));
        press(&mut app, KeyCode::Char('o'));
        assert!(app.access().portal().spinning);

        press(&mut app, KeyCode::Char('e'));
        assert!(!app.access().portal().spinning);
        assert_eq!(app.access().auth_state(), AuthState::Idle);
    }

    #[test]
    fn orientation_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.orientation().degrees(), 350);
        press(&mut app, KeyCode::Char(']'));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.orientation().degrees(), 10);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.orientation().degrees(), 0);
    }

    #[test]
    fn inbox_key_raises_notice_and_esc_dismisses() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        type_str(&mut app, "hello");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.notice(), Some("Relay inbox length: 1"));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.notice(), None);
    }

    #[test]
    fn enter_opens_contact_under_cursor() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Ana");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        let ana = app.contacts().contacts()[0].id.clone();
        assert_eq!(app.selected_contact(), Some(&ana));

        press(&mut app, KeyCode::Char('m'));
        type_str(&mut app, "hi");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.contacts().history(&ana)[0].text, "h");
    }
}
