pub mod books;
pub mod checkout;
pub mod error;
pub mod health;
pub mod reservation;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;

use crate::infrastructure::AppState;
use error::ApiError;

/// Ids arrive unsigned; anything past `i32::MAX` cannot name a row
pub(crate) fn row_id(raw: u32) -> Result<i32, ApiError> {
    i32::try_from(raw).map_err(|_| ApiError::bad_request(format!("Id {} is out of range", raw)))
}

/// Router over a bare connection, building the state on the fly
pub fn api_router(db: DatabaseConnection) -> Router {
    api_router_with_state(AppState::new(db))
}

pub fn api_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::root))
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book))
        // Members
        .route("/users", get(user::list_users).post(user::create_user))
        .route("/users/:id", get(user::get_user))
        // Circulation
        .route("/checkout", post(checkout::checkout_book))
        .route("/checkouts", get(checkout::list_checkouts))
        .route("/return", post(checkout::return_book))
        // Reservations
        .route("/reserve", post(reservation::reserve_book))
        .route("/reservations", get(reservation::list_reservations))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_rejects_values_past_i32() {
        assert_eq!(row_id(7).unwrap(), 7);
        assert!(row_id(u32::MAX).is_err());
    }
}
