//! HTTP front end for the sizing engine
//!
//! Wraps the pure engine functions with rate limiting, schema validation,
//! structured logging and Prometheus metrics.

pub mod api;
pub mod config;
pub mod error;

pub use api::{create_router, serve, AppState};
pub use config::SizingConfig;
pub use error::ApiError;
