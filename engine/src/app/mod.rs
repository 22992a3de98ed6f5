//! The `App` facade: owns every component and turns user actions into state
//! changes plus exactly one Event Log entry each.

use std::time::{Duration, Instant};

use gate_core::{AccessController, EventLog, Orientation};
use gate_types::ui::{EditTarget, InputMode, UiOptions};
use gate_types::{ContactId, ShareToken};

use crate::contacts::ContactBook;
use crate::input::DraftInput;
use crate::relay::Relay;
use crate::storage::KvStore;
use crate::timers::PendingActivations;

mod actions;
mod editing;
mod init;

pub use actions::RELAY_FAILED_MESSAGE;
pub use init::{DataDir, DataDirSource};

/// Spinner cadence, independent of render FPS.
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct Drafts {
    credential: DraftInput,
    new_contact: DraftInput,
    chat: DraftInput,
    relay: DraftInput,
}

impl Drafts {
    fn get(&self, target: EditTarget) -> &DraftInput {
        match target {
            EditTarget::Credential => &self.credential,
            EditTarget::NewContact => &self.new_contact,
            EditTarget::Chat => &self.chat,
            EditTarget::Relay => &self.relay,
        }
    }

    fn get_mut(&mut self, target: EditTarget) -> &mut DraftInput {
        match target {
            EditTarget::Credential => &mut self.credential,
            EditTarget::NewContact => &mut self.new_contact,
            EditTarget::Chat => &mut self.chat,
            EditTarget::Relay => &mut self.relay,
        }
    }
}

#[derive(Debug)]
struct UiState {
    options: UiOptions,
    mode: InputMode,
    drafts: Drafts,
    /// Contact whose chat is shown. Not required to exist.
    selected_contact: Option<ContactId>,
    contact_cursor: usize,
    notice: Option<String>,
    tick: usize,
    last_ui_tick: Instant,
    should_quit: bool,
}

impl UiState {
    fn new(options: UiOptions) -> Self {
        Self {
            options,
            mode: InputMode::Normal,
            drafts: Drafts::default(),
            selected_contact: None,
            contact_cursor: 0,
            notice: None,
            tick: 0,
            last_ui_tick: Instant::now(),
            should_quit: false,
        }
    }
}

pub struct App {
    access: AccessController,
    log: EventLog,
    orientation: Orientation,
    contacts: ContactBook,
    relay: Relay,
    store: Box<dyn KvStore>,
    share_token: ShareToken,
    pending: PendingActivations,
    ui: UiState,
}

impl App {
    #[must_use]
    pub fn access(&self) -> &AccessController {
        &self.access
    }

    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    #[must_use]
    pub fn share_token(&self) -> &ShareToken {
        &self.share_token
    }

    #[must_use]
    pub fn pending_activations(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui.options
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        self.ui.mode
    }

    #[must_use]
    pub fn draft(&self, target: EditTarget) -> &DraftInput {
        self.ui.drafts.get(target)
    }

    #[must_use]
    pub fn selected_contact(&self) -> Option<&ContactId> {
        self.ui.selected_contact.as_ref()
    }

    #[must_use]
    pub fn contact_cursor(&self) -> usize {
        self.ui.contact_cursor
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.ui.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.ui.notice = None;
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.ui.tick
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.ui.should_quit
    }

    pub fn request_quit(&mut self) {
        self.ui.should_quit = true;
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Fire due activation tickets and advance the spinner.
    pub fn tick_at(&mut self, now: Instant) {
        for ticket in self.pending.take_due(now) {
            if let Some(event) = self.access.complete_activation(ticket) {
                self.log.append(event.to_string());
            }
        }

        if now.saturating_duration_since(self.ui.last_ui_tick) >= UI_TICK_INTERVAL {
            self.ui.last_ui_tick = now;
            self.ui.tick = self.ui.tick.wrapping_add(1);
        }
    }

    pub fn move_contact_cursor_up(&mut self) {
        self.ui.contact_cursor = self.ui.contact_cursor.saturating_sub(1);
    }

    pub fn move_contact_cursor_down(&mut self) {
        let last = self.contacts.len().saturating_sub(1);
        self.ui.contact_cursor = self.ui.contact_cursor.saturating_add(1).min(last);
    }

    /// Select the contact under the cursor, if any.
    pub fn open_contact_at_cursor(&mut self) {
        let id = self
            .contacts
            .contacts()
            .get(self.ui.contact_cursor)
            .map(|c| c.id.clone());
        if let Some(id) = id {
            self.select_contact(id);
        }
    }
}
