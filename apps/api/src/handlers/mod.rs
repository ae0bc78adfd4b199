// [apps/api/src/handlers/mod.rs]
pub mod auth;
pub mod emergency;
pub mod fleet;
pub mod incidents;
pub mod mobile;
