// [apps/dispatch-worker/src/lib.rs]
//! Dispatch Worker library root — the pool, its backoff
//! calculation, and its environment configuration.

pub mod backoff;
pub mod config;
pub mod worker;

pub use config::WorkerConfig;
pub use worker::DispatchWorkerPool;
