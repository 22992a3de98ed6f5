//! Access controller: key check, preconditions and the timed portal open.
//!
//! # State machine
//!
//! ```text
//! present key ──> Authorized | Unauthorized | Idle (empty key)
//! stand / word ──> preconditions
//! attempt ──> guard(key) ─> guard(standing) ─> guard(word) ─> Charging(ticket)
//!                                                                 │ after delay
//!                                                                 v
//!                                         complete(ticket) ─> Open (if generation current)
//! reset ──> everything cleared, generation advanced
//! ```
//!
//! The controller never reads a clock. A successful attempt hands back an
//! [`ActivationTicket`] carrying the due instant and the generation it was issued
//! under; whoever owns the timer calls [`AccessController::complete_activation`]
//! once it is due. Any transition that closes the portal advances the generation,
//! so a ticket issued before it is stale and completes as a no-op.

use std::fmt;
use std::time::{Duration, Instant};

use gate_types::{ActivationPreconditions, AuthState, Credential, Generation, PortalState};

/// The word a traveller must speak before activation.
pub const ACTIVATION_WORD: &str = "agt";

/// Spin-up time between a successful attempt and the portal opening.
pub const DEFAULT_ACTIVATION_DELAY: Duration = Duration::from_millis(900);

/// Accepted keys and timing, supplied at construction.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    short_key: Credential,
    long_key: Credential,
    activation_delay: Duration,
}

impl AccessPolicy {
    #[must_use]
    pub fn new(short_key: Credential, long_key: Credential, activation_delay: Duration) -> Self {
        Self {
            short_key,
            long_key,
            activation_delay,
        }
    }

    /// Exact comparison against the two accepted keys. An empty key never matches.
    #[must_use]
    pub fn recognizes(&self, credential: &Credential) -> bool {
        !credential.is_empty() && (*credential == self.short_key || *credential == self.long_key)
    }

    #[must_use]
    pub fn activation_delay(&self) -> Duration {
        self.activation_delay
    }
}

/// Which activation guard failed. Guards are evaluated in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    KeyNotRecognized,
    NotStanding,
    WordNotSpoken,
}

/// Observable outcome of a controller operation; its `Display` is the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEvent {
    NoKeyPresented,
    KeyCleared,
    KeyAuthorized,
    KeyUnauthorized,
    StandingChanged { standing: bool },
    WordSpoken,
    ActivationDenied(DenialReason),
    ActivationCharging,
    PortalOpened,
    SafetyReset,
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoKeyPresented => f.write_str("No key presented"),
            Self::KeyCleared => f.write_str("Key cleared"),
            Self::KeyAuthorized => f.write_str("Authorized key detected"),
            Self::KeyUnauthorized => f.write_str("Unauthorized key: field disruption"),
            Self::StandingChanged { standing: true } => {
                f.write_str("Traveller stood on Mars Plate")
            }
            Self::StandingChanged { standing: false } => {
                f.write_str("Traveller stepped off Mars Plate")
            }
            Self::WordSpoken => write!(f, "Activation word \"{ACTIVATION_WORD}\" spoken"),
            Self::ActivationDenied(DenialReason::KeyNotRecognized) => {
                f.write_str("Activation failed: correct magnetic key required")
            }
            Self::ActivationDenied(DenialReason::NotStanding) => {
                f.write_str("Activation failed: no traveller on Mars Plate")
            }
            Self::ActivationDenied(DenialReason::WordNotSpoken) => write!(
                f,
                "Activation failed: activation word \"{ACTIVATION_WORD}\" not detected"
            ),
            Self::ActivationCharging => {
                f.write_str("Authorization verified. Charging magnet, diamond ring engaging")
            }
            Self::PortalOpened => {
                f.write_str("Portal open. Transit funnel stable (simulation), ready for transit")
            }
            Self::SafetyReset => {
                f.write_str("Safety eject executed: portal closed, travellers removed")
            }
        }
    }
}

/// Pending delayed open, valid only while its generation is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationTicket {
    generation: Generation,
    due: Instant,
}

impl ActivationTicket {
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn due(&self) -> Instant {
        self.due
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Denied(DenialReason),
    Charging(ActivationTicket),
}

impl ActivationOutcome {
    #[must_use]
    pub fn event(&self) -> AccessEvent {
        match self {
            Self::Denied(reason) => AccessEvent::ActivationDenied(*reason),
            Self::Charging(_) => AccessEvent::ActivationCharging,
        }
    }

    #[must_use]
    pub fn ticket(&self) -> Option<ActivationTicket> {
        match self {
            Self::Denied(_) => None,
            Self::Charging(ticket) => Some(*ticket),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessController {
    policy: AccessPolicy,
    /// Last presented key. Survives `reset`; replaced by the next presentation.
    presented: Option<Credential>,
    auth: AuthState,
    preconditions: ActivationPreconditions,
    portal: PortalState,
    generation: Generation,
}

impl AccessController {
    #[must_use]
    pub fn new(policy: AccessPolicy) -> Self {
        Self {
            policy,
            presented: None,
            auth: AuthState::Idle,
            preconditions: ActivationPreconditions::default(),
            portal: PortalState::CLOSED,
            generation: Generation::default(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.auth
    }

    #[must_use]
    pub fn preconditions(&self) -> ActivationPreconditions {
        self.preconditions
    }

    #[must_use]
    pub fn portal(&self) -> PortalState {
        self.portal
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn has_recognized_key(&self) -> bool {
        self.presented
            .as_ref()
            .is_some_and(|key| self.policy.recognizes(key))
    }

    pub fn present_credential(&mut self, credential: Credential) -> AccessEvent {
        if credential.is_empty() {
            self.presented = None;
            self.auth = AuthState::Idle;
            return AccessEvent::NoKeyPresented;
        }

        let recognized = self.policy.recognizes(&credential);
        self.presented = Some(credential);
        if recognized {
            self.auth = AuthState::Authorized;
            AccessEvent::KeyAuthorized
        } else {
            // Standing and spoken word are left as they are.
            self.auth = AuthState::Unauthorized;
            self.portal = PortalState::CLOSED;
            self.generation = self.generation.next();
            AccessEvent::KeyUnauthorized
        }
    }

    pub fn clear_credential(&mut self) -> AccessEvent {
        self.presented = None;
        self.auth = AuthState::Idle;
        AccessEvent::KeyCleared
    }

    pub fn set_standing(&mut self, standing: bool) -> AccessEvent {
        self.preconditions.standing = standing;
        AccessEvent::StandingChanged { standing }
    }

    pub fn toggle_standing(&mut self) -> AccessEvent {
        self.set_standing(!self.preconditions.standing)
    }

    pub fn speak_activation_word(&mut self) -> AccessEvent {
        self.preconditions.spoken_word = true;
        AccessEvent::WordSpoken
    }

    /// Check the guards in order and, if all pass, start spinning and issue a ticket.
    ///
    /// A denied attempt changes nothing.
    pub fn attempt_activation(&mut self, now: Instant) -> ActivationOutcome {
        if !self.has_recognized_key() {
            return ActivationOutcome::Denied(DenialReason::KeyNotRecognized);
        }
        if !self.preconditions.standing {
            return ActivationOutcome::Denied(DenialReason::NotStanding);
        }
        if !self.preconditions.spoken_word {
            return ActivationOutcome::Denied(DenialReason::WordNotSpoken);
        }

        self.auth = AuthState::Authorized;
        self.portal.spinning = true;
        self.generation = self.generation.next();
        ActivationOutcome::Charging(ActivationTicket {
            generation: self.generation,
            due: now + self.policy.activation_delay,
        })
    }

    /// Open the portal for a due ticket. Stale tickets are dropped.
    pub fn complete_activation(&mut self, ticket: ActivationTicket) -> Option<AccessEvent> {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = %ticket.generation,
                current = %self.generation,
                "Dropping stale portal activation"
            );
            return None;
        }
        self.portal.open = true;
        Some(AccessEvent::PortalOpened)
    }

    pub fn reset(&mut self) -> AccessEvent {
        self.portal = PortalState::CLOSED;
        self.preconditions = ActivationPreconditions::default();
        self.auth = AuthState::Idle;
        self.generation = self.generation.next();
        AccessEvent::SafetyReset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: &str = "short-key";
    const LONG: &str = "a-much-longer-key.start";

    fn controller() -> AccessController {
        AccessController::new(AccessPolicy::new(
            Credential::new(SHORT),
            Credential::new(LONG),
            DEFAULT_ACTIVATION_DELAY,
        ))
    }

    fn ready(controller: &mut AccessController) {
        controller.present_credential(Credential::new(SHORT));
        controller.set_standing(true);
        controller.speak_activation_word();
    }

    #[test]
    fn both_accepted_keys_authorize() {
        for key in [SHORT, LONG] {
            let mut c = controller();
            assert_eq!(c.present_credential(Credential::new(key)), AccessEvent::KeyAuthorized);
            assert_eq!(c.auth_state(), AuthState::Authorized);
        }
    }

    #[test]
    fn unrecognized_keys_unauthorize_and_close_portal() {
        let start = Instant::now();
        for key in ["x", "short-key ", "SHORT-KEY", "a-much-longer-key", "short-keyshort-key"] {
            let mut c = controller();
            ready(&mut c);
            let ticket = c.attempt_activation(start).ticket().expect("charging");
            c.complete_activation(ticket);
            assert!(c.portal().open);

            assert_eq!(
                c.present_credential(Credential::new(key)),
                AccessEvent::KeyUnauthorized
            );
            assert_eq!(c.auth_state(), AuthState::Unauthorized);
            assert_eq!(c.portal(), PortalState::CLOSED);
        }
    }

    #[test]
    fn unauthorized_key_keeps_preconditions() {
        let mut c = controller();
        c.set_standing(true);
        c.speak_activation_word();
        c.present_credential(Credential::new("wrong"));
        assert_eq!(
            c.preconditions(),
            ActivationPreconditions {
                standing: true,
                spoken_word: true
            }
        );
    }

    #[test]
    fn empty_key_goes_idle_without_touching_portal() {
        let mut c = controller();
        ready(&mut c);
        let ticket = c.attempt_activation(Instant::now()).ticket().expect("charging");
        assert_eq!(c.present_credential(Credential::new("")), AccessEvent::NoKeyPresented);
        assert_eq!(c.auth_state(), AuthState::Idle);
        assert!(c.portal().spinning);
        assert_eq!(c.complete_activation(ticket), Some(AccessEvent::PortalOpened));
    }

    #[test]
    fn standing_message_follows_new_state() {
        let mut c = controller();
        assert_eq!(
            c.toggle_standing().to_string(),
            "Traveller stood on Mars Plate"
        );
        assert_eq!(
            c.toggle_standing().to_string(),
            "Traveller stepped off Mars Plate"
        );
        assert!(!c.preconditions().standing);
    }

    #[test]
    fn speaking_word_is_idempotent() {
        let mut c = controller();
        assert_eq!(c.speak_activation_word(), AccessEvent::WordSpoken);
        assert_eq!(c.speak_activation_word(), AccessEvent::WordSpoken);
        assert!(c.preconditions().spoken_word);
    }

    #[test]
    fn guards_fail_in_order() {
        let now = Instant::now();
        let mut c = controller();
        assert_eq!(
            c.attempt_activation(now),
            ActivationOutcome::Denied(DenialReason::KeyNotRecognized)
        );

        c.present_credential(Credential::new(LONG));
        assert_eq!(
            c.attempt_activation(now),
            ActivationOutcome::Denied(DenialReason::NotStanding)
        );

        c.set_standing(true);
        assert_eq!(
            c.attempt_activation(now),
            ActivationOutcome::Denied(DenialReason::WordNotSpoken)
        );
    }

    #[test]
    fn not_standing_denial_leaves_state_unchanged() {
        let now = Instant::now();
        for key in [Some(SHORT), Some("wrong"), None] {
            let mut c = controller();
            if let Some(key) = key {
                c.present_credential(Credential::new(key));
            }
            c.speak_activation_word();
            let auth_before = c.auth_state();
            let generation_before = c.generation();

            let outcome = c.attempt_activation(now);
            assert!(matches!(outcome, ActivationOutcome::Denied(_)));
            assert_eq!(c.auth_state(), auth_before);
            assert_eq!(c.generation(), generation_before);
            assert_eq!(c.portal(), PortalState::CLOSED);
        }
    }

    #[test]
    fn success_spins_immediately_and_opens_on_completion() {
        let now = Instant::now();
        let mut c = controller();
        ready(&mut c);

        let outcome = c.attempt_activation(now);
        assert_eq!(outcome.event(), AccessEvent::ActivationCharging);
        let ticket = outcome.ticket().expect("charging");
        assert!(c.portal().spinning);
        assert!(!c.portal().open);
        assert_eq!(ticket.due(), now + DEFAULT_ACTIVATION_DELAY);
        assert!(!ticket.is_due(now + DEFAULT_ACTIVATION_DELAY - Duration::from_millis(1)));
        assert!(ticket.is_due(now + DEFAULT_ACTIVATION_DELAY));

        assert_eq!(c.complete_activation(ticket), Some(AccessEvent::PortalOpened));
        assert!(c.portal().open);
    }

    #[test]
    fn reset_invalidates_pending_ticket() {
        let mut c = controller();
        ready(&mut c);
        let ticket = c.attempt_activation(Instant::now()).ticket().expect("charging");

        assert_eq!(c.reset(), AccessEvent::SafetyReset);
        assert_eq!(c.complete_activation(ticket), None);
        assert!(!c.portal().open);
    }

    #[test]
    fn newer_attempt_supersedes_older_ticket() {
        let now = Instant::now();
        let mut c = controller();
        ready(&mut c);
        let first = c.attempt_activation(now).ticket().expect("charging");
        let second = c
            .attempt_activation(now + Duration::from_millis(500))
            .ticket()
            .expect("charging");

        assert_eq!(c.complete_activation(first), None);
        assert_eq!(c.complete_activation(second), Some(AccessEvent::PortalOpened));
    }

    #[test]
    fn unauthorized_key_invalidates_pending_ticket() {
        let mut c = controller();
        ready(&mut c);
        let ticket = c.attempt_activation(Instant::now()).ticket().expect("charging");
        c.present_credential(Credential::new("intruder"));
        assert_eq!(c.complete_activation(ticket), None);
        assert!(!c.portal().open);
    }

    #[test]
    fn reset_clears_everything_from_any_state() {
        let now = Instant::now();
        let mut states = vec![controller()];

        let mut open = controller();
        ready(&mut open);
        let ticket = open.attempt_activation(now).ticket().expect("charging");
        open.complete_activation(ticket);
        states.push(open);

        let mut unauthorized = controller();
        unauthorized.set_standing(true);
        unauthorized.present_credential(Credential::new("nope"));
        states.push(unauthorized);

        for mut c in states {
            c.reset();
            c.reset();
            assert_eq!(c.portal(), PortalState::CLOSED);
            assert_eq!(c.preconditions(), ActivationPreconditions::default());
            assert_eq!(c.auth_state(), AuthState::Idle);
        }
    }

    #[test]
    fn presented_key_survives_reset() {
        let now = Instant::now();
        let mut c = controller();
        ready(&mut c);
        c.reset();
        c.set_standing(true);
        c.speak_activation_word();

        let outcome = c.attempt_activation(now);
        assert_eq!(outcome.event(), AccessEvent::ActivationCharging);
        assert_eq!(c.auth_state(), AuthState::Authorized);
    }

    #[test]
    fn cleared_key_fails_key_guard() {
        let mut c = controller();
        ready(&mut c);
        assert_eq!(c.clear_credential(), AccessEvent::KeyCleared);
        assert_eq!(c.auth_state(), AuthState::Idle);
        assert_eq!(
            c.attempt_activation(Instant::now()),
            ActivationOutcome::Denied(DenialReason::KeyNotRecognized)
        );
    }

    #[test]
    fn empty_configured_key_never_matches() {
        let policy = AccessPolicy::new(Credential::new(""), Credential::new(LONG), DEFAULT_ACTIVATION_DELAY);
        assert!(!policy.recognizes(&Credential::new("")));
        assert!(policy.recognizes(&Credential::new(LONG)));
    }
}
