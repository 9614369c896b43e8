//! Circulation Service - checkout engine
//!
//! Moves copies between `available` and `checked_out`, computes overdue
//! fines and hands returned copies to the head of the reservation queue.
//!
//! Every mutation of a book's copies or queue happens while holding that
//! book's lock and inside a single transaction, and the state flips
//! themselves are conditional updates. A copy therefore never gets two open
//! checkouts and a reservation is never served twice, even under
//! concurrent requests.

use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;

use super::reservation_service;
use crate::domain::DomainError;
use crate::infrastructure::locks::BookLocks;
use crate::models::checkout::{self, Entity as Checkout};
use crate::models::copy::{self, CopyStatus, Entity as Copy};
use crate::models::reservation;
use crate::models::user::Entity as User;
use crate::utils::time::{format_timestamp, parse_timestamp};

/// Length of a loan
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// Flat fine per full day late
pub const FINE_PER_DAY: i64 = 10;

/// Result of a successful checkout
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub checkout_id: i32,
    pub book_copy_id: i32,
    pub due_date: String,
}

/// A reservation served by a return
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfilledReservation {
    pub reservation_id: i32,
    pub user_id: i32,
    pub checkout_id: i32,
    pub due_date: String,
}

/// Result of a successful return
#[derive(Debug, Clone)]
pub struct ReturnReceipt {
    pub checkout_id: i32,
    pub fine: i64,
    pub fulfilled_reservation: Option<FulfilledReservation>,
}

/// Fine owed for returning at `returned_at` a loan due at `due`.
///
/// Only full 24-hour periods count; returning on or before the due date
/// costs nothing.
pub fn compute_fine(due: DateTime<Utc>, returned_at: DateTime<Utc>) -> i64 {
    if returned_at <= due {
        return 0;
    }
    (returned_at - due).num_days() * FINE_PER_DAY
}

pub fn due_date_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(LOAN_PERIOD_DAYS)
}

/// Circulation context: the store plus the per-book locks
pub struct Circulation<'a> {
    db: &'a DatabaseConnection,
    locks: &'a BookLocks,
}

impl<'a> Circulation<'a> {
    pub fn new(db: &'a DatabaseConnection, locks: &'a BookLocks) -> Self {
        Self { db, locks }
    }

    /// Check out any available copy of `book_id` for `user_id`
    pub async fn checkout_book(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<CheckoutReceipt, DomainError> {
        self.checkout_with(user_id, book_id, Utc::now).await
    }

    pub async fn checkout_book_at(
        &self,
        user_id: i32,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> Result<CheckoutReceipt, DomainError> {
        self.checkout_with(user_id, book_id, move || now).await
    }

    async fn checkout_with(
        &self,
        user_id: i32,
        book_id: i32,
        clock: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<CheckoutReceipt, DomainError> {
        // 1. Resolve user and role
        let user = User::find_by_id(user_id)
            .one(self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;

        if !user.role.can_checkout() {
            return Err(DomainError::Forbidden(
                "Only students can checkout".to_string(),
            ));
        }

        // 2. Claim a copy and open the checkout atomically
        let _guard = self.locks.lock(book_id).await;
        let now = clock();
        let txn = self.db.begin().await?;

        let copy = claim_available_copy(&txn, book_id).await?.ok_or_else(|| {
            DomainError::Unavailable("No copies available. You may reserve.".to_string())
        })?;

        let saved = open_checkout(&txn, user.id, copy.id, now).await?;

        txn.commit().await?;

        tracing::info!(
            checkout_id = saved.id,
            user_id = user.id,
            book_id,
            copy_id = copy.id,
            "Book checked out"
        );

        Ok(CheckoutReceipt {
            checkout_id: saved.id,
            book_copy_id: copy.id,
            due_date: saved.due_date,
        })
    }

    /// Return a checkout, compute its fine and serve the next reservation
    pub async fn return_book(&self, checkout_id: i32) -> Result<ReturnReceipt, DomainError> {
        self.return_with(checkout_id, Utc::now).await
    }

    pub async fn return_book_at(
        &self,
        checkout_id: i32,
        now: DateTime<Utc>,
    ) -> Result<ReturnReceipt, DomainError> {
        self.return_with(checkout_id, move || now).await
    }

    async fn return_with(
        &self,
        checkout_id: i32,
        clock: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<ReturnReceipt, DomainError> {
        // 1. Find checkout
        let existing = Checkout::find_by_id(checkout_id)
            .one(self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound("Checkout not found".to_string()))?;

        if existing.returned {
            return Err(DomainError::AlreadyReturned);
        }

        let copy = Copy::find_by_id(existing.book_copy_id)
            .one(self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound("Associated copy not found".to_string()))?;

        let due = parse_timestamp(&existing.due_date)?;

        let _guard = self.locks.lock(copy.book_id).await;
        let now = clock();
        let txn = self.db.begin().await?;

        // 2. Close the checkout; losing a race with another return is a double return
        let closed = Checkout::update_many()
            .col_expr(checkout::Column::Returned, Expr::value(true))
            .filter(checkout::Column::Id.eq(existing.id))
            .filter(checkout::Column::Returned.eq(false))
            .exec(&txn)
            .await?;
        if closed.rows_affected == 0 {
            return Err(DomainError::AlreadyReturned);
        }

        // 3. Put the copy back on the shelf
        set_copy_status(&txn, copy.id, CopyStatus::Available).await?;

        // 4. Fine is reported, never stored
        let fine = compute_fine(due, now);

        // 5. Hand the copy to the head of the queue, if any
        let fulfilled = drain_queue(&txn, &copy, now).await?;

        txn.commit().await?;

        tracing::info!(checkout_id = existing.id, copy_id = copy.id, fine, "Book returned");

        Ok(ReturnReceipt {
            checkout_id: existing.id,
            fine,
            fulfilled_reservation: fulfilled,
        })
    }

    /// Join the waitlist for `book_id`
    pub async fn reserve(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<reservation::Model, DomainError> {
        self.reserve_with(user_id, book_id, Utc::now).await
    }

    pub async fn reserve_at(
        &self,
        user_id: i32,
        book_id: i32,
        now: DateTime<Utc>,
    ) -> Result<reservation::Model, DomainError> {
        self.reserve_with(user_id, book_id, move || now).await
    }

    // Timestamps are read under the book lock so queue order matches lock order
    async fn reserve_with(
        &self,
        user_id: i32,
        book_id: i32,
        clock: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<reservation::Model, DomainError> {
        let _guard = self.locks.lock(book_id).await;
        let now = clock();
        let saved = reservation_service::enqueue(self.db, user_id, book_id, now).await?;

        tracing::info!(reservation_id = saved.id, user_id, book_id, "Book reserved");

        Ok(saved)
    }

    /// All checkouts, returned ones included
    pub async fn list_checkouts(&self) -> Result<Vec<checkout::Model>, DomainError> {
        let checkouts = Checkout::find()
            .order_by_asc(checkout::Column::Id)
            .all(self.db)
            .await?;
        Ok(checkouts)
    }

    /// All reservations, served ones included
    pub async fn list_reservations(&self) -> Result<Vec<reservation::Model>, DomainError> {
        reservation_service::list_reservations(self.db).await
    }
}

/// Flip the lowest-id available copy of a book to checked_out
async fn claim_available_copy<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<Option<copy::Model>, DomainError> {
    loop {
        let Some(candidate) = Copy::find()
            .filter(copy::Column::BookId.eq(book_id))
            .filter(copy::Column::Status.eq(CopyStatus::Available))
            .order_by_asc(copy::Column::Id)
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        let claimed = Copy::update_many()
            .col_expr(
                copy::Column::Status,
                Expr::value(CopyStatus::CheckedOut.to_value()),
            )
            .filter(copy::Column::Id.eq(candidate.id))
            .filter(copy::Column::Status.eq(CopyStatus::Available))
            .exec(conn)
            .await?;

        if claimed.rows_affected == 1 {
            return Ok(Some(copy::Model {
                status: CopyStatus::CheckedOut,
                ..candidate
            }));
        }
        // Someone else took it between the read and the write; try the next one
    }
}

async fn set_copy_status<C: ConnectionTrait>(
    conn: &C,
    copy_id: i32,
    status: CopyStatus,
) -> Result<(), DomainError> {
    Copy::update_many()
        .col_expr(copy::Column::Status, Expr::value(status.to_value()))
        .filter(copy::Column::Id.eq(copy_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn open_checkout<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    copy_id: i32,
    now: DateTime<Utc>,
) -> Result<checkout::Model, DomainError> {
    let saved = checkout::ActiveModel {
        user_id: Set(user_id),
        book_copy_id: Set(copy_id),
        due_date: Set(format_timestamp(due_date_from(now))),
        returned: Set(false),
        created_at: Set(format_timestamp(now)),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(saved)
}

/// Serve the earliest eligible reservation of the copy's book with `copy`.
///
/// Reservations are accepted without checks, so the head may name a user
/// that does not exist or may not hold checkouts; those are retired
/// without a checkout and the next one is tried.
async fn drain_queue<C: ConnectionTrait>(
    conn: &C,
    copy: &copy::Model,
    now: DateTime<Utc>,
) -> Result<Option<FulfilledReservation>, DomainError> {
    while let Some(head) = reservation_service::peek_next(conn, copy.book_id).await? {
        if !reservation_service::deactivate(conn, head.id).await? {
            continue;
        }

        let eligible = User::find_by_id(head.user_id)
            .one(conn)
            .await?
            .is_some_and(|u| u.role.can_checkout());
        if !eligible {
            tracing::warn!(
                reservation_id = head.id,
                user_id = head.user_id,
                "Skipping reservation of a user who cannot hold checkouts"
            );
            continue;
        }

        set_copy_status(conn, copy.id, CopyStatus::CheckedOut).await?;
        let saved = open_checkout(conn, head.user_id, copy.id, now).await?;

        tracing::info!(
            reservation_id = head.id,
            user_id = head.user_id,
            checkout_id = saved.id,
            "Reservation fulfilled on return"
        );

        return Ok(Some(FulfilledReservation {
            reservation_id: head.id,
            user_id: head.user_id,
            checkout_id: saved.id,
            due_date: saved.due_date,
        }));
    }

    Ok(None)
}
