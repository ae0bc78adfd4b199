// [libs/domain/lifecycle/src/lib.rs]
//! Lifecycle Coordinator and its supporting daemons: centralised
//! authorisation, the incident FSM's predecessor table, the Workload
//! Ledger that keeps org/division/staff load in lockstep with
//! incident transitions, the acceptance-deadline sweep, and the
//! hourly load reconciliation job.

mod coordinator;
mod fsm;
mod ledger;
mod policy;
mod reconcile;
mod sweep;

pub use coordinator::{CreateIncidentInput, LifecycleCoordinator};
pub use fsm::{accept_is_noop, allowed_predecessor, validate, Transition};
pub use ledger::{AssignmentTriplet, WorkloadLedger};
pub use policy::{authorise, Action, IncidentAuthContext, PolicyDecision};
pub use reconcile::ReconciliationService;
pub use sweep::DeadlineSweepService;
