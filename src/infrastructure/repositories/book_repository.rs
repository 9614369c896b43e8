//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{BookRepository, DomainError};
use crate::models::book::{ActiveModel, Book, Column, Entity as BookEntity, NewBook};
use crate::models::copy::{self, CopyStatus, Entity as CopyEntity};
use crate::utils::time::format_timestamp;

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self) -> Result<Vec<Book>, DomainError> {
        let books_with_copies = BookEntity::find()
            .find_with_related(CopyEntity)
            .order_by_asc(Column::Id)
            .order_by_asc(copy::Column::Id)
            .all(&self.db)
            .await?;

        Ok(books_with_copies
            .into_iter()
            .map(|(book, copies)| Book::with_copies(book, copies))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let Some(book) = BookEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let copies = CopyEntity::find()
            .filter(copy::Column::BookId.eq(book.id))
            .order_by_asc(copy::Column::Id)
            .all(&self.db)
            .await?;

        Ok(Some(Book::with_copies(book, copies)))
    }

    async fn create(&self, input: NewBook) -> Result<Book, DomainError> {
        let now = format_timestamp(chrono::Utc::now());
        let copy_count = input.copy_count();

        let txn = self.db.begin().await?;

        let book = ActiveModel {
            title: Set(input.title),
            author: Set(input.author),
            isbn: Set(input.isbn),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut copies = Vec::with_capacity(copy_count);
        for _ in 0..copy_count {
            let copy = copy::ActiveModel {
                book_id: Set(book.id),
                status: Set(CopyStatus::Available),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            copies.push(copy);
        }

        txn.commit().await?;

        tracing::info!(book_id = book.id, copies = copies.len(), "Book catalogued");

        Ok(Book::with_copies(book, copies))
    }
}
