//! Access and portal state types.

use std::fmt;

/// A presented key. Compared by exact equality; no hashing, no normalization.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Manual Debug impl to keep key material out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential([REDACTED])")
        }
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Idle,
    Authorized,
    Unauthorized,
}

impl AuthState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Authorized => "authorized",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags that must both hold (besides a recognized key) before activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationPreconditions {
    /// Traveller is on the activation plate.
    pub standing: bool,
    /// Activation word has been spoken since the last reset.
    pub spoken_word: bool,
}

impl ActivationPreconditions {
    #[must_use]
    pub fn satisfied(self) -> bool {
        self.standing && self.spoken_word
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortalState {
    pub open: bool,
    pub spinning: bool,
}

impl PortalState {
    pub const CLOSED: Self = Self {
        open: false,
        spinning: false,
    };
}
