//! Domain layer
//!
//! Error vocabulary shared by services and handlers, plus the repository
//! traits the catalog and membership endpoints are written against.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
