use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::api::error::{ApiError, JsonBody};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::user::{self, Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    /// `student` or `librarian`
    pub role: String,
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [user::Model])
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<user::Model>>, ApiError> {
    Ok(Json(state.user_repo.find_all().await?))
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User registered"),
        (status = 400, description = "Malformed body or invalid role")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    // Role is checked before anything is written
    let role: Role = payload.role.parse()?;

    let user = state.user_repo.create(payload.name, role).await?;

    Ok(Json(json!({
        "message": "User created successfully",
        "user_id": user.id,
    })))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = user::Model),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<user::Model>, ApiError> {
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}
