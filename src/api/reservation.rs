use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::api::error::{ApiError, JsonBody};
use crate::api::row_id;
use crate::infrastructure::AppState;
use crate::models::reservation;

/// Neither id is checked against the catalog or the members
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveRequest {
    pub user_id: u32,
    pub book_id: u32,
}

#[utoipa::path(
    post,
    path = "/reserve",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Reservation queued"),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn reserve_book(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ReserveRequest>,
) -> Result<Json<Value>, ApiError> {
    let saved = state
        .circulation()
        .reserve(row_id(payload.user_id)?, row_id(payload.book_id)?)
        .await?;

    Ok(Json(json!({
        "message": "Book reserved successfully",
        "reservation_id": saved.id,
    })))
}

#[utoipa::path(
    get,
    path = "/reservations",
    responses(
        (status = 200, description = "All reservations, served ones included", body = [reservation::Model])
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<reservation::Model>>, ApiError> {
    Ok(Json(state.circulation().list_reservations().await?))
}
