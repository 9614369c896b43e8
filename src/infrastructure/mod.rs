//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Per-book locks for circulation (locks)
//! - Repository implementations (repositories)
//! - Application state (state)
//! - Demo data (seed)

pub mod config;
pub mod db;
pub mod locks;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;

pub use repositories::*;
pub use state::AppState;
