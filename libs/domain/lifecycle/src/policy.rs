// [libs/domain/lifecycle/src/policy.rs]
/*!
 * Centralised authorisation: every role check the
 * HTTP handlers would otherwise sprinkle across themselves lives
 * here instead, invoked once at the Lifecycle Coordinator boundary.
 * Handlers extract a `Principal`; they never decide `Allow`/`Deny`.
 */

use aegis_domain_models::{Principal, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    StartWindow,
    Accept,
    Reject,
    Complete,
    Cancel,
    UpdateNotes,
    Delete,
    ManageFleet,
}

/// The slice of incident state a decision needs — not the whole
/// aggregate, so callers don't have to load one just to authorise it.
#[derive(Debug, Clone, Default)]
pub struct IncidentAuthContext {
    pub assigned_staff_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(String),
}

impl PolicyDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }
}

pub fn authorise(principal: &Principal, action: Action, resource: &IncidentAuthContext) -> PolicyDecision {
    use Action::*;

    match action {
        Create => {
            if matches!(principal.role, Role::Admin | Role::Responder) {
                PolicyDecision::Allow
            } else {
                PolicyDecision::Deny("create requires admin or responder role".into())
            }
        }
        StartWindow | Cancel | Delete | ManageFleet => {
            if principal.is_admin() {
                PolicyDecision::Allow
            } else {
                PolicyDecision::Deny(format!("{action:?} is admin-only"))
            }
        }
        Accept | Reject | Complete => {
            if !principal.is_responder() {
                return PolicyDecision::Deny(format!("{action:?} requires the responder role"));
            }
            match &resource.assigned_staff_id {
                Some(staff_id) if staff_id == &principal.id => PolicyDecision::Allow,
                Some(_) => PolicyDecision::Deny("only the assigned responder may act on this incident".into()),
                None => PolicyDecision::Deny("incident has no assigned responder".into()),
            }
        }
        UpdateNotes => {
            if matches!(principal.role, Role::Admin | Role::Responder) {
                PolicyDecision::Allow
            } else {
                PolicyDecision::Deny("update requires admin or responder role".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder(id: &str) -> Principal {
        Principal { id: id.to_string(), role: Role::Responder }
    }

    #[test]
    fn assigned_responder_may_accept() {
        let ctx = IncidentAuthContext { assigned_staff_id: Some("staff-1".into()) };
        assert_eq!(authorise(&responder("staff-1"), Action::Accept, &ctx), PolicyDecision::Allow);
    }

    #[test]
    fn other_responder_may_not_accept() {
        let ctx = IncidentAuthContext { assigned_staff_id: Some("staff-1".into()) };
        assert!(!authorise(&responder("staff-2"), Action::Accept, &ctx).is_allow());
    }

    #[test]
    fn only_admin_may_start_window() {
        let ctx = IncidentAuthContext::default();
        assert!(!authorise(&responder("staff-1"), Action::StartWindow, &ctx).is_allow());
    }
}
