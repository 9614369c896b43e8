//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Services can be called directly or through Axum handlers.

pub mod circulation_service;
pub mod reservation_service;

// Re-export for convenience
pub use circulation_service::{
    CheckoutReceipt, Circulation, FulfilledReservation, ReturnReceipt, compute_fine,
};
