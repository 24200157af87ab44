//! Customer database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Customer;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub is_active: bool,
    pub order_count: i64,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_spent_amount: Decimal,
    pub last_order_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Customer {
            id: model.id,
            name: model.name,
            phone: model.phone,
            email: model.email,
            notes: model.notes,
            is_active: model.is_active,
            order_count: model.order_count,
            total_spent_amount: model.total_spent_amount,
            last_order_at: model.last_order_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
