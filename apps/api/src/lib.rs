// [apps/api/src/lib.rs]
//! Aegis Hub HTTP surface library root.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod token;

pub use routes::build_router;
pub use state::AppState;
