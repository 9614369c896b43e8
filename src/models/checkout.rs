use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "checkouts")]
#[schema(as = Checkout)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub book_copy_id: i32,
    /// RFC 3339, creation time + loan period
    pub due_date: String,
    /// Flips to true exactly once, on return
    pub returned: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::copy::Entity",
        from = "Column::BookCopyId",
        to = "super::copy::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Copy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
}

impl Related<super::copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copy.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
