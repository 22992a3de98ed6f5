//! UI state types for the TUI layer.
//!
//! Pure data types with no IO, no async, no ratatui dependency.
//! Used by both the engine (state ownership) and tui (rendering/input).

/// UI configuration options derived from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

/// Which text field an edit session writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Credential,
    NewContact,
    Chat,
    Relay,
}

impl EditTarget {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Credential => "KEY",
            Self::NewContact => "CONTACT",
            Self::Chat => "CHAT",
            Self::Relay => "RELAY",
        }
    }

    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Credential => "Magnetic Key",
            Self::NewContact => "New contact name",
            Self::Chat | Self::Relay => "Type message",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Editing(EditTarget),
}

impl InputMode {
    #[must_use]
    pub fn edit_target(self) -> Option<EditTarget> {
        match self {
            Self::Normal => None,
            Self::Editing(target) => Some(target),
        }
    }
}
