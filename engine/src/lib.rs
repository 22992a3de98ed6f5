//! Engine for the gate panel: state ownership, storage and orchestration.
//!
//! This crate contains the [`App`] facade without TUI dependencies. Every user
//! action goes through `App`, which drives the pure components from
//! `gate-core`, persists through an injected [`KvStore`], and appends to the
//! Event Log.

mod app;
mod contacts;
mod input;
mod relay;
mod storage;
mod timers;
mod util;

pub use app::{App, DataDir, DataDirSource};
pub use contacts::ContactBook;
pub use input::DraftInput;
pub use relay::{RELAY_QUEUED_MESSAGE, Relay};
pub use storage::{
    CHAT_HISTORIES_KEY, CONTACT_LIST_KEY, FileStore, KvStore, MemoryStore, RELAY_INBOX_KEY_PREFIX,
    SHARE_TOKEN_KEY, StoreError, load_json, save_json,
};
pub use timers::PendingActivations;

pub use app::RELAY_FAILED_MESSAGE;

// Re-export the types the TUI and tests need alongside `App`.
pub use gate_config::GateConfig;
pub use gate_core::{
    ACTIVATION_WORD, AccessController, AccessEvent, DenialReason, EventLog, LogEntry, Orientation,
};
pub use gate_types::ui::{EditTarget, InputMode, UiOptions};
pub use gate_types::{
    ActivationPreconditions, AuthState, ChatMessage, Contact, ContactId, PortalState, RelayEntry,
    ShareToken, sanitize_terminal_text,
};
