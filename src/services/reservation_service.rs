//! Reservation queue - per-book FIFO waitlist
//!
//! The queue of a book is its active reservations ordered by `created_at`
//! (ties broken by id). Callers that both read the head and consume it are
//! expected to hold the book's lock and run inside one transaction.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::domain::DomainError;
use crate::models::reservation::{self, Entity as Reservation};
use crate::utils::time::format_timestamp;

/// Append a reservation to the book's queue. Neither the user nor the book
/// is checked, and a user may queue several times for the same book.
pub async fn enqueue<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    book_id: i32,
    now: DateTime<Utc>,
) -> Result<reservation::Model, DomainError> {
    let saved = reservation::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        created_at: Set(format_timestamp(now)),
        active: Set(true),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(saved)
}

/// Earliest active reservation of a book, if any
pub async fn peek_next<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<Option<reservation::Model>, DomainError> {
    let head = Reservation::find()
        .filter(reservation::Column::BookId.eq(book_id))
        .filter(reservation::Column::Active.eq(true))
        .order_by_asc(reservation::Column::CreatedAt)
        .order_by_asc(reservation::Column::Id)
        .one(conn)
        .await?;

    Ok(head)
}

/// Mark a reservation as served. Returns false if it was no longer active,
/// so a reservation is consumed at most once.
pub async fn deactivate<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, DomainError> {
    let result = Reservation::update_many()
        .col_expr(reservation::Column::Active, Expr::value(false))
        .filter(reservation::Column::Id.eq(id))
        .filter(reservation::Column::Active.eq(true))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

/// All reservations, served ones included
pub async fn list_reservations<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<reservation::Model>, DomainError> {
    let reservations = Reservation::find()
        .order_by_asc(reservation::Column::Id)
        .all(conn)
        .await?;

    Ok(reservations)
}
