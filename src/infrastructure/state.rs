//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, UserRepository};
use crate::infrastructure::locks::BookLocks;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmUserRepository};
use crate::services::circulation_service::Circulation;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    db: DatabaseConnection,
    /// Book repository (catalog)
    pub book_repo: Arc<dyn BookRepository>,
    /// User repository (membership)
    pub user_repo: Arc<dyn UserRepository>,
    /// Per-book locks shared by checkout, return and reserve
    pub book_locks: Arc<BookLocks>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let user_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));

        Self {
            db,
            book_repo,
            user_repo,
            book_locks: Arc::new(BookLocks::new()),
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Circulation context (checkout engine + reservation queue) bound to
    /// this state's connection and locks
    pub fn circulation(&self) -> Circulation<'_> {
        Circulation::new(&self.db, &self.book_locks)
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
