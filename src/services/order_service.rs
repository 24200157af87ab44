//! Order lifecycle service.
//!
//! Orders are priced once against the current cost and sale profiles and
//! then only move through status, approval and discount transitions.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use super::CatalogService;
use crate::config::ORDER_CODE_MAX_ATTEMPTS;
use crate::domain::order::code::{candidate_code, fallback_code};
use crate::domain::order::pricing::build_lines;
use crate::domain::{
    Actor, ApprovalDecision, CollectionStatus, DiscountDecision, DomainError, FulfillmentStatus,
    LineRequest, NewOrder, Order, SupplierPaymentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{OrderFilter, OrderStatusWrite, UnitOfWork};
use crate::types::PaginationParams;

/// Input for a new order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: Uuid,
    pub delivery_date: NaiveDate,
    pub note: Option<String>,
    pub lines: Vec<LineRequest>,
}

/// Status axes to change; unset axes stay as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusUpdate {
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub supplier_payment_status: Option<SupplierPaymentStatus>,
    pub collection_status: Option<CollectionStatus>,
}

impl StatusUpdate {
    pub fn is_empty(&self) -> bool {
        self.fulfillment_status.is_none()
            && self.supplier_payment_status.is_none()
            && self.collection_status.is_none()
    }
}

/// Order service trait for dependency injection.
///
/// Sellers only see and change their own orders; admins see all of them.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Price and open a new order owned by the actor
    async fn create(&self, actor: Actor, draft: OrderDraft) -> AppResult<Order>;

    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Order>;

    async fn get_by_code(&self, actor: Actor, code: String) -> AppResult<Order>;

    /// List orders; a seller's filter is pinned to their own id
    async fn list(
        &self,
        actor: Actor,
        filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)>;

    async fn update_status(&self, actor: Actor, id: Uuid, update: StatusUpdate)
        -> AppResult<Order>;

    /// Admin verdict on a pending order
    async fn decide_approval(
        &self,
        actor: Actor,
        id: Uuid,
        decision: ApprovalDecision,
        note: Option<String>,
    ) -> AppResult<Order>;

    async fn request_discount(
        &self,
        actor: Actor,
        id: Uuid,
        percent: Decimal,
        reason: Option<String>,
    ) -> AppResult<Order>;

    /// Admin verdict on a pending discount request
    async fn decide_discount(
        &self,
        actor: Actor,
        id: Uuid,
        decision: DiscountDecision,
        note: Option<String>,
    ) -> AppResult<Order>;
}

pub struct OrderEngine<U: UnitOfWork> {
    uow: Arc<U>,
    catalog: Arc<dyn CatalogService>,
}

impl<U: UnitOfWork> OrderEngine<U> {
    pub fn new(uow: Arc<U>, catalog: Arc<dyn CatalogService>) -> Self {
        Self { uow, catalog }
    }

    /// Random codes first, then a timestamp-suffixed fallback.
    async fn next_code(&self, now: DateTime<Utc>) -> AppResult<String> {
        let orders = self.uow.orders();
        for attempt in 1..=ORDER_CODE_MAX_ATTEMPTS {
            let code = candidate_code(now);
            if !orders.code_exists(&code).await? {
                return Ok(code);
            }
            tracing::debug!(attempt, code = %code, "Order code collision");
        }

        let code = fallback_code(now);
        tracing::warn!(code = %code, "Random order codes exhausted, using fallback");
        Ok(code)
    }

    /// Load an order the actor may access.
    async fn load(&self, actor: Actor, id: Uuid) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Order")?;
        ensure_access(actor, &order)?;
        Ok(order)
    }
}

fn ensure_access(actor: Actor, order: &Order) -> AppResult<()> {
    if actor.can_access(order.seller_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden.into())
    }
}

fn ensure_admin(actor: Actor) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderEngine<U> {
    async fn create(&self, actor: Actor, draft: OrderDraft) -> AppResult<Order> {
        let (cost, sale) = tokio::try_join!(
            self.catalog.current_cost_profile(),
            self.catalog.current_sale_profile(Some(actor.seller_id)),
        )?;

        let customer = self
            .uow
            .customers()
            .find_by_id(draft.customer_id)
            .await?
            .ok_or_not_found("Customer")?;
        if !customer.is_active {
            return Err(AppError::validation(format!(
                "Customer {} is inactive",
                customer.name
            )));
        }

        let items = build_lines(&cost, &sale, &draft.lines)?;

        let now = Utc::now();
        let code = self.next_code(now).await?;
        let order = Order::new(
            NewOrder {
                code,
                seller_id: actor.seller_id,
                customer_id: customer.id,
                customer_name: customer.name,
                delivery_date: draft.delivery_date,
                note: draft
                    .note
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
                cost_profile: cost.snapshot(),
                sale_profile: sale.snapshot(),
                items,
            },
            now,
        );
        let order = self.uow.orders().create(order).await?;

        tracing::info!(
            order_id = %order.id,
            order_code = %order.code,
            seller_id = %order.seller_id,
            total_sale_amount = %order.totals.total_sale_amount,
            "Order created"
        );

        // Aggregates are best effort; the order stands either way.
        if let Err(e) = self
            .uow
            .customers()
            .record_order(order.customer_id, order.totals.total_sale_amount, now)
            .await
        {
            tracing::warn!(
                customer_id = %order.customer_id,
                order_code = %order.code,
                error = %e,
                "Failed to update customer aggregates"
            );
        }

        Ok(order)
    }

    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Order> {
        self.load(actor, id).await
    }

    async fn get_by_code(&self, actor: Actor, code: String) -> AppResult<Order> {
        let order = self
            .uow
            .orders()
            .find_by_code(code.trim())
            .await?
            .ok_or_not_found("Order")?;
        ensure_access(actor, &order)?;
        Ok(order)
    }

    async fn list(
        &self,
        actor: Actor,
        mut filter: OrderFilter,
        params: PaginationParams,
    ) -> AppResult<(Vec<Order>, u64)> {
        filter.seller_id = actor.scope(filter.seller_id);
        self.uow.orders().list(filter, params).await
    }

    async fn update_status(
        &self,
        actor: Actor,
        id: Uuid,
        update: StatusUpdate,
    ) -> AppResult<Order> {
        if update.is_empty() {
            return Err(AppError::validation("No status change requested"));
        }

        let mut order = self.load(actor, id).await?;
        let expected = order.fulfillment_status;
        let now = Utc::now();
        if let Some(next) = update.fulfillment_status {
            order.set_fulfillment_status(next, now)?;
        }
        if let Some(next) = update.supplier_payment_status {
            order.set_supplier_payment_status(next, now);
        }
        if let Some(next) = update.collection_status {
            order.set_collection_status(next, now);
        }

        let write = OrderStatusWrite {
            fulfillment_status: order.fulfillment_status,
            supplier_payment_status: order.supplier_payment_status,
            collection_status: order.collection_status,
            updated_at: order.updated_at,
        };
        let order = self
            .uow
            .orders()
            .update_status(order.id, expected, write)
            .await?;
        tracing::info!(
            order_code = %order.code,
            fulfillment_status = %order.fulfillment_status,
            supplier_payment_status = %order.supplier_payment_status,
            collection_status = %order.collection_status,
            "Order status updated"
        );
        Ok(order)
    }

    async fn decide_approval(
        &self,
        actor: Actor,
        id: Uuid,
        decision: ApprovalDecision,
        note: Option<String>,
    ) -> AppResult<Order> {
        ensure_admin(actor)?;
        let mut order = self.load(actor, id).await?;
        order.decide_approval(decision, actor.seller_id, note, Utc::now())?;

        let order = self.uow.orders().save(order).await?;
        tracing::info!(
            order_code = %order.code,
            decision = %decision,
            reviewer_id = %actor.seller_id,
            "Order approval decided"
        );
        Ok(order)
    }

    async fn request_discount(
        &self,
        actor: Actor,
        id: Uuid,
        percent: Decimal,
        reason: Option<String>,
    ) -> AppResult<Order> {
        let mut order = self.load(actor, id).await?;
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        order.request_discount(actor.seller_id, percent, reason, Utc::now())?;

        let order = self.uow.orders().save(order).await?;
        tracing::info!(
            order_code = %order.code,
            percent = %percent,
            requested_by = %actor.seller_id,
            "Discount requested"
        );
        Ok(order)
    }

    async fn decide_discount(
        &self,
        actor: Actor,
        id: Uuid,
        decision: DiscountDecision,
        note: Option<String>,
    ) -> AppResult<Order> {
        ensure_admin(actor)?;
        let mut order = self.load(actor, id).await?;
        order.decide_discount(decision, actor.seller_id, note, Utc::now())?;

        let order = self.uow.orders().save(order).await?;
        tracing::info!(
            order_code = %order.code,
            decision = %decision,
            total_sale_amount = %order.totals.total_sale_amount,
            "Discount decided"
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApprovalStatus, PriceProfile, PriceProfileKind, SellerRole};
    use crate::infra::{MockCustomerRepository, MockOrderRepository, MockPriceProfileRepository};
    use crate::services::test_support::{
        actor, customer, profile, BuiltUnitOfWork, TestUnitOfWork,
    };
    use crate::services::Catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine(uow: TestUnitOfWork) -> OrderEngine<BuiltUnitOfWork> {
        let uow = uow.build();
        let catalog = Arc::new(Catalog::new(uow.clone()));
        OrderEngine::new(uow, catalog)
    }

    fn profiles(cost: Option<PriceProfile>, sale: Option<PriceProfile>) -> MockPriceProfileRepository {
        let mut repo = MockPriceProfileRepository::new();
        repo.expect_find_active().returning(move |scope| {
            Ok(match (scope.kind, scope.seller_id) {
                (PriceProfileKind::Cost, _) => cost.clone(),
                (PriceProfileKind::Sale, None) => sale.clone(),
                (PriceProfileKind::Sale, Some(_)) => None,
            })
        });
        repo
    }

    fn draft(customer_id: Uuid, product_id: Uuid, weight: i64) -> OrderDraft {
        OrderDraft {
            customer_id,
            delivery_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            note: Some("  ".to_string()),
            lines: vec![LineRequest {
                product_id,
                weight_kg: Decimal::from(weight),
            }],
        }
    }

    #[tokio::test]
    async fn test_create_prices_order_from_current_profiles() {
        let product_id = Uuid::new_v4();
        let buyer = customer(true);
        let buyer_id = buyer.id;

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(buyer.clone())));
        customers
            .expect_record_order()
            .times(1)
            .returning(|_, amount, _| {
                assert_eq!(amount, Decimal::from(260_000));
                Err(AppError::internal("aggregates unavailable"))
            });

        let mut orders = MockOrderRepository::new();
        orders.expect_code_exists().returning(|_| Ok(false));
        orders.expect_create().times(1).returning(Ok);

        let uow = TestUnitOfWork::default()
            .with_price_profiles(profiles(
                Some(profile(PriceProfileKind::Cost, None, &[(product_id, 100_000)])),
                Some(profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)])),
            ))
            .with_customers(customers)
            .with_orders(orders);

        let order = engine(uow)
            .create(actor(SellerRole::Seller), draft(buyer_id, product_id, 2))
            .await
            .unwrap();

        assert_eq!(order.totals.total_cost_amount, Decimal::from(200_000));
        assert_eq!(order.totals.total_sale_amount, Decimal::from(260_000));
        assert_eq!(order.totals.total_profit_amount, Decimal::from(60_000));
        assert_eq!(order.fulfillment_status, FulfillmentStatus::PendingApproval);
        assert!(order.note.is_none());
    }

    #[tokio::test]
    async fn test_create_without_cost_profile_fails() {
        let product_id = Uuid::new_v4();
        let mut orders = MockOrderRepository::new();
        orders.expect_create().never();

        let uow = TestUnitOfWork::default()
            .with_price_profiles(profiles(
                None,
                Some(profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)])),
            ))
            .with_orders(orders);

        let result = engine(uow)
            .create(actor(SellerRole::Seller), draft(Uuid::new_v4(), product_id, 2))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_with_unpriced_product_fails() {
        let priced = Uuid::new_v4();
        let buyer = customer(true);
        let buyer_id = buyer.id;

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(buyer.clone())));
        let mut orders = MockOrderRepository::new();
        orders.expect_create().never();

        let uow = TestUnitOfWork::default()
            .with_price_profiles(profiles(
                Some(profile(PriceProfileKind::Cost, None, &[(priced, 100_000)])),
                Some(profile(PriceProfileKind::Sale, None, &[(priced, 130_000)])),
            ))
            .with_customers(customers)
            .with_orders(orders);

        let result = engine(uow)
            .create(actor(SellerRole::Seller), draft(buyer_id, Uuid::new_v4(), 2))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_for_inactive_customer_fails() {
        let product_id = Uuid::new_v4();
        let buyer = customer(false);
        let buyer_id = buyer.id;

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(buyer.clone())));

        let uow = TestUnitOfWork::default()
            .with_price_profiles(profiles(
                Some(profile(PriceProfileKind::Cost, None, &[(product_id, 100_000)])),
                Some(profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)])),
            ))
            .with_customers(customers);

        let result = engine(uow)
            .create(actor(SellerRole::Seller), draft(buyer_id, product_id, 2))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_retries_code_on_collision() {
        let product_id = Uuid::new_v4();
        let buyer = customer(true);
        let buyer_id = buyer.id;

        let mut customers = MockCustomerRepository::new();
        customers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(buyer.clone())));
        customers.expect_record_order().returning(|_, _, _| Ok(()));

        let checks = Arc::new(AtomicUsize::new(0));
        let counter = checks.clone();
        let mut orders = MockOrderRepository::new();
        orders
            .expect_code_exists()
            .returning(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst) == 0));
        orders.expect_create().times(1).returning(Ok);

        let uow = TestUnitOfWork::default()
            .with_price_profiles(profiles(
                Some(profile(PriceProfileKind::Cost, None, &[(product_id, 100_000)])),
                Some(profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)])),
            ))
            .with_customers(customers)
            .with_orders(orders);

        let order = engine(uow)
            .create(actor(SellerRole::Seller), draft(buyer_id, product_id, 1))
            .await
            .unwrap();

        assert_eq!(checks.load(Ordering::SeqCst), 2);
        assert!(order.code.starts_with(crate::config::ORDER_CODE_PREFIX));
    }

    #[tokio::test]
    async fn test_seller_cannot_load_foreign_order() {
        let product_id = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, None, &[(product_id, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)]);
        let owner = actor(SellerRole::Seller);
        let order = Order::new(
            NewOrder {
                code: "DH-20240601-0001".to_string(),
                seller_id: owner.seller_id,
                customer_id: Uuid::new_v4(),
                customer_name: "Chị Hoa".to_string(),
                delivery_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                note: None,
                cost_profile: cost.snapshot(),
                sale_profile: sale.snapshot(),
                items: build_lines(
                    &cost,
                    &sale,
                    &[LineRequest {
                        product_id,
                        weight_kg: Decimal::ONE,
                    }],
                )
                .unwrap(),
            },
            Utc::now(),
        );

        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_save().never();

        let engine = engine(TestUnitOfWork::default().with_orders(orders));
        let intruder = actor(SellerRole::Seller);

        let result = engine.get(intruder, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let result = engine
            .decide_approval(owner, Uuid::new_v4(), ApprovalDecision::ApproveOrder, None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_status_update_writes_only_status_columns() {
        let product_id = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, None, &[(product_id, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, None, &[(product_id, 130_000)]);
        let owner = actor(SellerRole::Seller);
        let order = Order::new(
            NewOrder {
                code: "DH-20240601-0002".to_string(),
                seller_id: owner.seller_id,
                customer_id: Uuid::new_v4(),
                customer_name: "Chị Hoa".to_string(),
                delivery_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                note: None,
                cost_profile: cost.snapshot(),
                sale_profile: sale.snapshot(),
                items: build_lines(
                    &cost,
                    &sale,
                    &[LineRequest {
                        product_id,
                        weight_kg: Decimal::ONE,
                    }],
                )
                .unwrap(),
            },
            Utc::now(),
        );
        let order_id = order.id;

        // An admin approves the order between our read and our write.
        let mut stored = order.clone();
        stored.approval.status = ApprovalStatus::Approved;
        stored.collection_status = CollectionStatus::PaidInFull;

        let mut orders = MockOrderRepository::new();
        orders
            .expect_find_by_id()
            .returning(move |_| Ok(Some(order.clone())));
        orders.expect_save().never();
        orders
            .expect_update_status()
            .times(1)
            .withf(move |id, expected, write| {
                *id == order_id
                    && *expected == FulfillmentStatus::PendingApproval
                    && write.fulfillment_status == FulfillmentStatus::PendingApproval
                    && write.collection_status == CollectionStatus::PaidInFull
                    && write.supplier_payment_status == SupplierPaymentStatus::UnpaidSupplier
            })
            .returning(move |_, _, _| Ok(stored.clone()));

        let engine = engine(TestUnitOfWork::default().with_orders(orders));
        let update = StatusUpdate {
            collection_status: Some(CollectionStatus::PaidInFull),
            ..StatusUpdate::default()
        };

        let updated = engine.update_status(owner, order_id, update).await.unwrap();
        assert_eq!(updated.approval.status, ApprovalStatus::Approved);
        assert_eq!(updated.collection_status, CollectionStatus::PaidInFull);
    }

    #[tokio::test]
    async fn test_empty_status_update_is_rejected() {
        let result = engine(TestUnitOfWork::default())
            .update_status(
                actor(SellerRole::Admin),
                Uuid::new_v4(),
                StatusUpdate::default(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
