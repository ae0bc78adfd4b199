// [libs/domain/lifecycle/src/fsm.rs]
//! Pure predecessor-state table for the incident FSM. Checked
//! before a transition ever touches the Store, so an obviously
//! illegal request (e.g. `accept` on a `Done` incident) comes back as
//! `INVALID_STATE` without spending a transaction; a legal-looking
//! request that loses a race with a concurrent writer still comes
//! back from the Store layer as `CONFLICT`.

use aegis_domain_models::{CoreError, IncidentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    StartWindow,
    Accept,
    Reject,
    Complete,
    Cancel,
    DeadlineExpiry,
}

pub fn allowed_predecessor(transition: Transition) -> &'static [IncidentStatus] {
    use IncidentStatus::*;
    use Transition::*;

    match transition {
        StartWindow => &[Pending],
        Accept => &[PendingAssignment],
        Reject => &[PendingAssignment],
        DeadlineExpiry => &[PendingAssignment],
        Complete => &[InProgress],
        Cancel => &[Pending, PendingAssignment, InProgress],
    }
}

pub fn validate(transition: Transition, current: IncidentStatus) -> Result<(), CoreError> {
    if allowed_predecessor(transition).contains(&current) {
        Ok(())
    } else {
        let expected = allowed_predecessor(transition).iter().map(|s| s.as_str().to_string()).collect();
        Err(CoreError::InvalidState { expected, found: current.as_str().to_string() })
    }
}

/// `accept` is idempotent: calling it again on an incident already in
/// `InProgress` that the same staffer owns is a successful no-op
/// rather than an `INVALID_STATE`.
pub fn accept_is_noop(current: IncidentStatus) -> bool {
    current == IncidentStatus::InProgress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_rejects_done_incident() {
        assert!(validate(Transition::Accept, IncidentStatus::Done).is_err());
    }

    #[test]
    fn start_window_only_from_pending() {
        assert!(validate(Transition::StartWindow, IncidentStatus::Pending).is_ok());
        assert!(validate(Transition::StartWindow, IncidentStatus::InProgress).is_err());
    }

    #[test]
    fn cancel_allowed_from_any_non_terminal_state() {
        assert!(validate(Transition::Cancel, IncidentStatus::Pending).is_ok());
        assert!(validate(Transition::Cancel, IncidentStatus::PendingAssignment).is_ok());
        assert!(validate(Transition::Cancel, IncidentStatus::InProgress).is_ok());
        assert!(validate(Transition::Cancel, IncidentStatus::Done).is_err());
    }
}
