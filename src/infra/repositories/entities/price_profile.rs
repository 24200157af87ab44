//! Price profile entity. Items are stored as a JSON array.

use sea_orm::entity::prelude::*;

use super::{decode_enum, decode_json};
use crate::domain::{PriceProfile, PriceProfileKind};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "price_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub seller_id: Option<Uuid>,
    pub effective_from: DateTimeUtc,
    pub is_active: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for PriceProfile {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(PriceProfile {
            id: model.id,
            kind: decode_enum("price_profiles.kind", &model.kind, PriceProfileKind::parse(&model.kind))?,
            name: model.name,
            seller_id: model.seller_id,
            effective_from: model.effective_from,
            is_active: model.is_active,
            items: decode_json("price_profiles.items", model.items)?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
