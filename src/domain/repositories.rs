//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::book::{Book, NewBook};
use crate::models::user::{self, Role};

/// Repository trait for the catalog (books and their copies)
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books, each with its copies attached
    async fn find_all(&self) -> Result<Vec<Book>, DomainError>;

    /// Find a single book with its copies
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Create a book and its copies, all initially available
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;
}

/// Repository trait for library members
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find all users
    async fn find_all(&self) -> Result<Vec<user::Model>, DomainError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DomainError>;

    /// Register a new user
    async fn create(&self, name: String, role: Role) -> Result<user::Model, DomainError>;
}
