// [libs/infra/dispatch_client/src/lib.rs]
//! Outbound adapter to the mobile ticket-creation endpoint the
//! Dispatch Worker delivers queued jobs to.

pub mod client;

pub use client::{DeliveryOutcome, DispatchSinkClient};
