//! Core domain logic for the gate panel.
//!
//! Pure state machines with no IO. Time is always passed in by the caller so
//! every transition can be driven deterministically from tests:
//!
//! - [`AccessController`]: key check, standing check, spoken-word check, timed open
//! - [`EventLog`]: bounded newest-first log every user action writes to
//! - [`Orientation`]: display-only rotation dial

pub mod access;
mod event_log;
mod orientation;

pub use access::{
    ACTIVATION_WORD, AccessController, AccessEvent, AccessPolicy, ActivationOutcome,
    ActivationTicket, DEFAULT_ACTIVATION_DELAY, DenialReason,
};
pub use event_log::{DEFAULT_LOG_CAPACITY, EventLog, LogEntry};
pub use orientation::{Orientation, OrientationEvent, ROTATION_STEP_DEGREES};
