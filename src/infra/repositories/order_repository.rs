//! Order storage and report projections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use super::entities::decode_enum;
use super::entities::order::{self, to_active_model, Entity as OrderEntity};
use super::unique_violation_as;
use crate::domain::{
    ApprovalStatus, CollectionStatus, DiscountStatus, FulfillmentStatus, Order, OrderFigures,
    SupplierPaymentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Order query filter. `from` is inclusive and `to` exclusive, both on
/// `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub seller_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub supplier_payment_status: Option<SupplierPaymentStatus>,
    pub collection_status: Option<CollectionStatus>,
    pub approval_status: Option<ApprovalStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// New values of the three progress statuses.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStatusWrite {
    pub fulfillment_status: FulfillmentStatus,
    pub supplier_payment_status: SupplierPaymentStatus,
    pub collection_status: CollectionStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn code_exists(&self, code: &str) -> AppResult<bool>;

    /// Insert a new order; a duplicate code is a conflict
    async fn create(&self, order: Order) -> AppResult<Order>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Order>>;

    /// One page of orders, newest first, plus the total match count
    async fn list(
        &self,
        filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)>;

    /// Persist the mutable state of an existing order
    async fn save(&self, order: Order) -> AppResult<Order>;

    /// Write only the status columns, provided the fulfillment status is
    /// still `expected`
    async fn update_status(
        &self,
        id: Uuid,
        expected: FulfillmentStatus,
        write: OrderStatusWrite,
    ) -> AppResult<Order>;

    /// Status and money columns of every matching order
    async fn figures(&self, filter: OrderFilter) -> AppResult<Vec<OrderFigures>>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn filtered(filter: &OrderFilter) -> Select<OrderEntity> {
    let mut query = OrderEntity::find();
    if let Some(seller_id) = filter.seller_id {
        query = query.filter(order::Column::SellerId.eq(seller_id));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(order::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.fulfillment_status {
        query = query.filter(order::Column::FulfillmentStatus.eq(status.as_str()));
    }
    if let Some(status) = filter.supplier_payment_status {
        query = query.filter(order::Column::SupplierPaymentStatus.eq(status.as_str()));
    }
    if let Some(status) = filter.collection_status {
        query = query.filter(order::Column::CollectionStatus.eq(status.as_str()));
    }
    if let Some(status) = filter.approval_status {
        query = query.filter(order::Column::ApprovalStatus.eq(status.as_str()));
    }
    if let Some(from) = filter.from {
        query = query.filter(order::Column::CreatedAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(order::Column::CreatedAt.lt(to));
    }
    query
}

/// Narrow projection used by reports.
#[derive(Debug, FromQueryResult)]
struct FigureRow {
    created_at: DateTime<Utc>,
    fulfillment_status: String,
    supplier_payment_status: String,
    collection_status: String,
    approval_status: String,
    discount_status: String,
    total_weight_kg: Decimal,
    total_cost_amount: Decimal,
    total_sale_amount: Decimal,
    total_profit_amount: Decimal,
}

impl TryFrom<FigureRow> for OrderFigures {
    type Error = AppError;

    fn try_from(row: FigureRow) -> Result<Self, Self::Error> {
        Ok(OrderFigures {
            created_at: row.created_at,
            fulfillment_status: decode_enum(
                "orders.fulfillment_status",
                &row.fulfillment_status,
                FulfillmentStatus::parse(&row.fulfillment_status),
            )?,
            supplier_payment_status: decode_enum(
                "orders.supplier_payment_status",
                &row.supplier_payment_status,
                SupplierPaymentStatus::parse(&row.supplier_payment_status),
            )?,
            collection_status: decode_enum(
                "orders.collection_status",
                &row.collection_status,
                CollectionStatus::parse(&row.collection_status),
            )?,
            approval_status: decode_enum(
                "orders.approval_status",
                &row.approval_status,
                ApprovalStatus::parse(&row.approval_status),
            )?,
            discount_status: decode_enum(
                "orders.discount_status",
                &row.discount_status,
                DiscountStatus::parse(&row.discount_status),
            )?,
            total_weight_kg: row.total_weight_kg,
            total_cost_amount: row.total_cost_amount,
            total_sale_amount: row.total_sale_amount,
            total_profit_amount: row.total_profit_amount,
        })
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        let count = OrderEntity::find()
            .filter(order::Column::Code.eq(code))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;
        Ok(count > 0)
    }

    async fn create(&self, order: Order) -> AppResult<Order> {
        let model = to_active_model(&order)?
            .insert(&self.db)
            .await
            .map_err(unique_violation_as("Order code"))?;
        Order::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(Order::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Order>> {
        let result = OrderEntity::find()
            .filter(order::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(Order::try_from).transpose()
    }

    async fn list(
        &self,
        filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        let paginator = filtered(&filter)
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page() - 1).await?;

        let orders = models
            .into_iter()
            .map(Order::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((orders, total))
    }

    async fn save(&self, order: Order) -> AppResult<Order> {
        let model = to_active_model(&order)?
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => AppError::not_found("Order"),
                e => AppError::from(e),
            })?;
        Order::try_from(model)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: FulfillmentStatus,
        write: OrderStatusWrite,
    ) -> AppResult<Order> {
        let result = OrderEntity::update_many()
            .col_expr(
                order::Column::FulfillmentStatus,
                Expr::value(write.fulfillment_status.as_str()),
            )
            .col_expr(
                order::Column::SupplierPaymentStatus,
                Expr::value(write.supplier_payment_status.as_str()),
            )
            .col_expr(
                order::Column::CollectionStatus,
                Expr::value(write.collection_status.as_str()),
            )
            .col_expr(order::Column::UpdatedAt, Expr::value(write.updated_at))
            .filter(order::Column::Id.eq(id))
            .filter(order::Column::FulfillmentStatus.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        let order = self.find_by_id(id).await?.ok_or_not_found("Order")?;
        if result.rows_affected == 0 {
            return Err(AppError::validation(format!(
                "Order {} is now {}; reload and retry",
                order.code, order.fulfillment_status
            )));
        }
        Ok(order)
    }

    async fn figures(&self, filter: OrderFilter) -> AppResult<Vec<OrderFigures>> {
        let rows = filtered(&filter)
            .select_only()
            .column(order::Column::CreatedAt)
            .column(order::Column::FulfillmentStatus)
            .column(order::Column::SupplierPaymentStatus)
            .column(order::Column::CollectionStatus)
            .column(order::Column::ApprovalStatus)
            .column(order::Column::DiscountStatus)
            .column(order::Column::TotalWeightKg)
            .column(order::Column::TotalCostAmount)
            .column(order::Column::TotalSaleAmount)
            .column(order::Column::TotalProfitAmount)
            .into_model::<FigureRow>()
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        rows.into_iter().map(OrderFigures::try_from).collect()
    }
}
