use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::copy;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::copy::Entity")]
    Copies,
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copies.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses: a book with its copies attached
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: Vec<copy::Model>,
}

impl Book {
    pub fn with_copies(model: Model, copies: Vec<copy::Model>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            copies,
        }
    }
}

/// Input for cataloguing a new book together with its copies
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub num_of_copies: i32,
}

impl NewBook {
    /// Copies to create; a negative request creates none.
    pub fn copy_count(&self) -> usize {
        self.num_of_copies.max(0) as usize
    }
}
