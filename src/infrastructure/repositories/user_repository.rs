//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::{DomainError, UserRepository};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity, Model, Role};
use crate::utils::time::format_timestamp;

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<Model>, DomainError> {
        let users = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Model>, DomainError> {
        Ok(UserEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, name: String, role: Role) -> Result<Model, DomainError> {
        let user = ActiveModel {
            name: Set(name),
            role: Set(role),
            created_at: Set(format_timestamp(chrono::Utc::now())),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");

        Ok(user)
    }
}
