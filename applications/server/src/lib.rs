//! Vibesia Server Library
//!
//! HTTP API for the Vibesia music catalog: authentication, public song
//! reads, owner-scoped playlist management and the admin audit view.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::auth::AuthService;
pub use state::AppState;
