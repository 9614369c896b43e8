//! Catalog API handlers using repository pattern

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
use crate::models::book::{Book, NewBook};

/// Request DTO for cataloguing a book
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Copies to create; zero or negative creates none
    pub num_of_copies: i32,
}

#[utoipa::path(
    get,
    path = "/books",
    responses(
        (status = 200, description = "All books with their copies", body = [Book])
    )
)]
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.book_repo.find_all().await?;
    Ok(Json(books))
}

#[utoipa::path(
    post,
    path = "/books",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Book added"),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBookRequest>,
) -> Result<Json<Value>, ApiError> {
    let book = state
        .book_repo
        .create(NewBook {
            title: payload.title,
            author: payload.author,
            isbn: payload.isbn,
            num_of_copies: payload.num_of_copies,
        })
        .await?;

    Ok(Json(json!({
        "message": "Book added successfully",
        "book_id": book.id,
    })))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book with its copies", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Book not found".to_string()))?;
    Ok(Json(book))
}
