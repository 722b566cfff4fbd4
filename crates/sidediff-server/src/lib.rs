//! HTTP server for sidediff.
//!
//! Exposes part submission and diff retrieval over REST, staging payloads
//! through a shared [`DiffCoordinator`](sidediff_sdk::DiffCoordinator).

pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use envelope::{DiffResponse, HealthResponse, PartEnvelope};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::{shutdown_signal, SideDiffServer};
