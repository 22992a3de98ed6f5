//! Draft editing driven by the TUI.

use gate_types::ui::{EditTarget, InputMode};

use super::App;

impl App {
    pub fn begin_edit(&mut self, target: EditTarget) {
        self.ui.drafts.get_mut(target).move_cursor_end();
        self.ui.mode = InputMode::Editing(target);
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(target) = self.ui.mode.edit_target() {
            self.ui.drafts.get_mut(target).enter_char(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(target) = self.ui.mode.edit_target() {
            self.ui.drafts.get_mut(target).delete_char();
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(target) = self.ui.mode.edit_target() {
            self.ui.drafts.get_mut(target).move_cursor_left();
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(target) = self.ui.mode.edit_target() {
            self.ui.drafts.get_mut(target).move_cursor_right();
        }
    }

    /// Leave edit mode keeping the draft text.
    pub fn cancel_edit(&mut self) {
        self.ui.mode = InputMode::Normal;
    }

    /// Leave edit mode and run the action for the field being edited.
    ///
    /// The key field keeps its text after submission. The other drafts are
    /// consumed, except a chat draft that was not sent.
    pub fn submit_edit(&mut self) {
        let Some(target) = self.ui.mode.edit_target() else {
            return;
        };
        self.ui.mode = InputMode::Normal;

        match target {
            EditTarget::Credential => {
                let value = self.ui.drafts.credential.text().to_string();
                self.present_credential(&value);
            }
            EditTarget::NewContact => {
                let name = self.ui.drafts.new_contact.take_text();
                self.add_contact(&name);
            }
            EditTarget::Chat => {
                let Some(id) = self.ui.selected_contact.clone() else {
                    return;
                };
                let text = self.ui.drafts.chat.text().to_string();
                if self.send_message(&id, &text) {
                    self.ui.drafts.chat.clear();
                }
            }
            EditTarget::Relay => {
                let text = self.ui.drafts.relay.take_text();
                self.send_to_relay(&text);
            }
        }
    }
}
