//! Seller database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Seller, SellerRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sellers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub is_enabled: bool,
    pub password_hash: String,
    pub must_change_password: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seller_session::Entity")]
    Sessions,
}

impl Related<super::seller_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Seller {
    fn from(model: Model) -> Self {
        Seller {
            id: model.id,
            username: model.username,
            display_name: model.display_name,
            role: SellerRole::from(model.role.as_str()),
            is_enabled: model.is_enabled,
            password_hash: model.password_hash,
            must_change_password: model.must_change_password,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
