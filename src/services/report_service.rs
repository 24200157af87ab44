//! Reporting service - read-only aggregation over orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::report::build_trend;
use crate::domain::{Actor, DashboardStats, TrendBucket, TrendGranularity, TrendWindow};
use crate::errors::{AppError, AppResult};
use crate::infra::{OrderFilter, UnitOfWork};

/// Trend series for one seller, or for everyone when `seller_id` is absent.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerTrend {
    pub seller_id: Option<Uuid>,
    pub granularity: TrendGranularity,
    pub buckets: Vec<TrendBucket>,
}

#[async_trait]
pub trait ReportService: Send + Sync {
    /// Dashboard figures over `[from, to)`; both bounds optional
    async fn dashboard(
        &self,
        actor: Actor,
        seller_id: Option<Uuid>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<DashboardStats>;

    /// Zero-filled order count, sale and profit buckets over `window`
    async fn seller_trend(
        &self,
        actor: Actor,
        seller_id: Option<Uuid>,
        window: TrendWindow,
    ) -> AppResult<SellerTrend>;
}

pub struct Reporter<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Reporter<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReportService for Reporter<U> {
    async fn dashboard(
        &self,
        actor: Actor,
        seller_id: Option<Uuid>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<DashboardStats> {
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(AppError::validation("'to' must not be before 'from'"));
            }
        }

        let figures = self
            .uow
            .orders()
            .figures(OrderFilter {
                seller_id: actor.scope(seller_id),
                from,
                to,
                ..Default::default()
            })
            .await?;

        Ok(DashboardStats::from_figures(&figures))
    }

    async fn seller_trend(
        &self,
        actor: Actor,
        seller_id: Option<Uuid>,
        window: TrendWindow,
    ) -> AppResult<SellerTrend> {
        window.validate()?;

        let seller_id = actor.scope(seller_id);
        let (from, to) = window.bounds();
        let figures = self
            .uow
            .orders()
            .figures(OrderFilter {
                seller_id,
                from: Some(from),
                to: Some(to),
                ..Default::default()
            })
            .await?;

        Ok(SellerTrend {
            seller_id,
            granularity: window.granularity(),
            buckets: build_trend(&window, &figures),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ApprovalStatus, CollectionStatus, DiscountStatus, FulfillmentStatus, OrderFigures,
        SellerRole, SupplierPaymentStatus,
    };
    use crate::infra::MockOrderRepository;
    use crate::services::test_support::{actor, BuiltUnitOfWork, TestUnitOfWork};
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    fn reporter(orders: MockOrderRepository) -> Reporter<BuiltUnitOfWork> {
        Reporter::new(TestUnitOfWork::default().with_orders(orders).build())
    }

    fn figures(day: u32, fulfillment: FulfillmentStatus, sale: i64) -> OrderFigures {
        OrderFigures {
            created_at: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
            fulfillment_status: fulfillment,
            supplier_payment_status: SupplierPaymentStatus::UnpaidSupplier,
            collection_status: CollectionStatus::Unpaid,
            approval_status: ApprovalStatus::Approved,
            discount_status: DiscountStatus::NotRequested,
            total_weight_kg: Decimal::from(2),
            total_cost_amount: Decimal::from(sale - 60_000),
            total_sale_amount: Decimal::from(sale),
            total_profit_amount: Decimal::from(60_000),
        }
    }

    #[tokio::test]
    async fn test_seller_dashboard_is_pinned_to_own_orders() {
        let seller = actor(SellerRole::Seller);
        let own_id = seller.seller_id;

        let mut orders = MockOrderRepository::new();
        orders.expect_figures().times(1).returning(move |filter| {
            assert_eq!(filter.seller_id, Some(own_id));
            Ok(vec![
                figures(1, FulfillmentStatus::Confirmed, 260_000),
                figures(2, FulfillmentStatus::Canceled, 260_000),
            ])
        });

        let stats = reporter(orders)
            .dashboard(seller, Some(Uuid::new_v4()), None, None)
            .await
            .unwrap();

        assert_eq!(stats.order_count, 1);
        assert_eq!(stats.total_sale_amount, Decimal::from(260_000));
    }

    #[tokio::test]
    async fn test_dashboard_rejects_inverted_range() {
        let mut orders = MockOrderRepository::new();
        orders.expect_figures().never();

        let now = Utc::now();
        let result = reporter(orders)
            .dashboard(
                actor(SellerRole::Admin),
                None,
                Some(now),
                Some(now - chrono::Duration::days(1)),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_daily_trend_is_zero_filled() {
        let mut orders = MockOrderRepository::new();
        orders
            .expect_figures()
            .returning(|_| Ok(vec![figures(2, FulfillmentStatus::Delivered, 260_000)]));

        let trend = reporter(orders)
            .seller_trend(
                actor(SellerRole::Admin),
                None,
                TrendWindow::Daily {
                    from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    to: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
                },
            )
            .await
            .unwrap();

        assert_eq!(trend.granularity, TrendGranularity::Day);
        assert_eq!(trend.buckets.len(), 3);
        assert!(trend.seller_id.is_none());
    }
}
