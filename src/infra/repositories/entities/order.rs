//! Order entity.
//!
//! Line items and profile snapshots are JSON; the approval and discount
//! sub-records are flattened into prefixed columns so reports can filter on
//! them without unpacking JSON.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::{decode_enum, decode_json, encode_json};
use crate::domain::order::{Approval, DiscountRequest};
use crate::domain::{
    ApprovalStatus, CollectionStatus, DiscountStatus, FulfillmentStatus, Order, OrderTotals,
    SupplierPaymentStatus,
};
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub seller_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub delivery_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub cost_profile: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub sale_profile: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub items: Json,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_weight_kg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_cost_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub base_sale_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_sale_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))")]
    pub total_profit_amount: Decimal,
    pub fulfillment_status: String,
    pub supplier_payment_status: String,
    pub collection_status: String,
    pub requires_admin_approval: bool,
    pub approval_status: String,
    pub approval_requested_at: DateTimeUtc,
    pub approval_reviewed_at: Option<DateTimeUtc>,
    pub approval_reviewed_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub approval_note: Option<String>,
    pub discount_status: String,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub discount_percent: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub discount_amount: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((20, 4)))", nullable)]
    pub discount_sale_amount: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub discount_reason: Option<String>,
    pub discount_requested_by: Option<Uuid>,
    pub discount_requested_at: Option<DateTimeUtc>,
    pub discount_reviewed_by: Option<Uuid>,
    pub discount_reviewed_at: Option<DateTimeUtc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub discount_review_note: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let fulfillment_status = decode_enum(
            "orders.fulfillment_status",
            &model.fulfillment_status,
            FulfillmentStatus::parse(&model.fulfillment_status),
        )?;
        let supplier_payment_status = decode_enum(
            "orders.supplier_payment_status",
            &model.supplier_payment_status,
            SupplierPaymentStatus::parse(&model.supplier_payment_status),
        )?;
        let collection_status = decode_enum(
            "orders.collection_status",
            &model.collection_status,
            CollectionStatus::parse(&model.collection_status),
        )?;
        let approval_status = decode_enum(
            "orders.approval_status",
            &model.approval_status,
            ApprovalStatus::parse(&model.approval_status),
        )?;
        let discount_status = decode_enum(
            "orders.discount_status",
            &model.discount_status,
            DiscountStatus::parse(&model.discount_status),
        )?;

        Ok(Order {
            id: model.id,
            code: model.code,
            seller_id: model.seller_id,
            customer_id: model.customer_id,
            customer_name: model.customer_name,
            delivery_date: model.delivery_date,
            note: model.note,
            cost_profile: decode_json("orders.cost_profile", model.cost_profile)?,
            sale_profile: decode_json("orders.sale_profile", model.sale_profile)?,
            items: decode_json("orders.items", model.items)?,
            totals: OrderTotals {
                total_weight_kg: model.total_weight_kg,
                total_cost_amount: model.total_cost_amount,
                base_sale_amount: model.base_sale_amount,
                total_sale_amount: model.total_sale_amount,
                total_profit_amount: model.total_profit_amount,
            },
            fulfillment_status,
            supplier_payment_status,
            collection_status,
            approval: Approval {
                requires_admin_approval: model.requires_admin_approval,
                status: approval_status,
                requested_at: model.approval_requested_at,
                reviewed_at: model.approval_reviewed_at,
                reviewed_by: model.approval_reviewed_by,
                note: model.approval_note,
            },
            discount_request: DiscountRequest {
                status: discount_status,
                percent: model.discount_percent,
                amount: model.discount_amount,
                sale_amount: model.discount_sale_amount,
                reason: model.discount_reason,
                requested_by: model.discount_requested_by,
                requested_at: model.discount_requested_at,
                reviewed_by: model.discount_reviewed_by,
                reviewed_at: model.discount_reviewed_at,
                review_note: model.discount_review_note,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Build a fully-set active model from the aggregate.
pub fn to_active_model(order: &Order) -> AppResult<ActiveModel> {
    Ok(ActiveModel {
        id: Set(order.id),
        code: Set(order.code.clone()),
        seller_id: Set(order.seller_id),
        customer_id: Set(order.customer_id),
        customer_name: Set(order.customer_name.clone()),
        delivery_date: Set(order.delivery_date),
        note: Set(order.note.clone()),
        cost_profile: Set(encode_json("orders.cost_profile", &order.cost_profile)?),
        sale_profile: Set(encode_json("orders.sale_profile", &order.sale_profile)?),
        items: Set(encode_json("orders.items", &order.items)?),
        total_weight_kg: Set(order.totals.total_weight_kg),
        total_cost_amount: Set(order.totals.total_cost_amount),
        base_sale_amount: Set(order.totals.base_sale_amount),
        total_sale_amount: Set(order.totals.total_sale_amount),
        total_profit_amount: Set(order.totals.total_profit_amount),
        fulfillment_status: Set(order.fulfillment_status.as_str().to_string()),
        supplier_payment_status: Set(order.supplier_payment_status.as_str().to_string()),
        collection_status: Set(order.collection_status.as_str().to_string()),
        requires_admin_approval: Set(order.approval.requires_admin_approval),
        approval_status: Set(order.approval.status.as_str().to_string()),
        approval_requested_at: Set(order.approval.requested_at),
        approval_reviewed_at: Set(order.approval.reviewed_at),
        approval_reviewed_by: Set(order.approval.reviewed_by),
        approval_note: Set(order.approval.note.clone()),
        discount_status: Set(order.discount_request.status.as_str().to_string()),
        discount_percent: Set(order.discount_request.percent),
        discount_amount: Set(order.discount_request.amount),
        discount_sale_amount: Set(order.discount_request.sale_amount),
        discount_reason: Set(order.discount_request.reason.clone()),
        discount_requested_by: Set(order.discount_request.requested_by),
        discount_requested_at: Set(order.discount_request.requested_at),
        discount_reviewed_by: Set(order.discount_request.reviewed_by),
        discount_reviewed_at: Set(order.discount_request.reviewed_at),
        discount_review_note: Set(order.discount_request.review_note.clone()),
        created_at: Set(order.created_at),
        updated_at: Set(order.updated_at),
    })
}
