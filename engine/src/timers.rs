//! Fire-and-forget delayed effects.
//!
//! Scheduled tickets cannot be cancelled. Invalidation happens at completion
//! time through the ticket's generation, so the queue only has to hand back
//! whatever has come due.

use std::time::Instant;

use gate_core::ActivationTicket;

#[derive(Debug, Default)]
pub struct PendingActivations {
    tickets: Vec<ActivationTicket>,
}

impl PendingActivations {
    pub fn schedule(&mut self, ticket: ActivationTicket) {
        self.tickets.push(ticket);
    }

    /// Remove and return every ticket due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<ActivationTicket> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tickets.drain(..).partition(|t| t.is_due(now));
        self.tickets = pending;
        due.sort_by_key(ActivationTicket::due);
        due
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
