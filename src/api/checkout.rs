//! Checkout and return handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::api::error::{ApiError, JsonBody};
use crate::api::row_id;
use crate::infrastructure::AppState;
use crate::models::checkout;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub user_id: u32,
    pub book_id: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub checkout_id: u32,
}

#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Copy checked out, returns checkout_id and due_date"),
        (status = 400, description = "Malformed body or no copies available"),
        (status = 403, description = "Only students can checkout"),
        (status = 404, description = "User not found")
    )
)]
pub async fn checkout_book(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let receipt = state
        .circulation()
        .checkout_book(row_id(payload.user_id)?, row_id(payload.book_id)?)
        .await?;

    Ok(Json(json!({
        "message": "Book checked out successfully",
        "checkout_id": receipt.checkout_id,
        "book_copy_id": receipt.book_copy_id,
        "due_date": receipt.due_date,
    })))
}

#[utoipa::path(
    get,
    path = "/checkouts",
    responses(
        (status = 200, description = "All checkouts", body = [checkout::Model])
    )
)]
pub async fn list_checkouts(
    State(state): State<AppState>,
) -> Result<Json<Vec<checkout::Model>>, ApiError> {
    Ok(Json(state.circulation().list_checkouts().await?))
}

#[utoipa::path(
    post,
    path = "/return",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Copy returned, returns the fine"),
        (status = 400, description = "Malformed body or already returned"),
        (status = 404, description = "Checkout not found")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReturnRequest>,
) -> Result<Json<Value>, ApiError> {
    let receipt = state
        .circulation()
        .return_book(row_id(payload.checkout_id)?)
        .await?;

    Ok(Json(json!({
        "message": "Book returned successfully",
        "fine": receipt.fine,
        "fulfilled_reservation": receipt.fulfilled_reservation,
    })))
}
