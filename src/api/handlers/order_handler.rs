//! Order handlers.
//!
//! Sellers work on their own orders; approvals and discount decisions are
//! admin only. Ownership and role rules are enforced by the order service.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{
    ApprovalDecision, ApprovalStatus, AuthSession, CollectionStatus, DiscountDecision,
    FulfillmentStatus, LineRequest, Order, SupplierPaymentStatus,
};
use crate::errors::AppResult;
use crate::infra::OrderFilter;
use crate::services::{OrderDraft, StatusUpdate};
use crate::types::{Created, Paginated, PaginationParams};

/// New order for one customer
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub delivery_date: NaiveDate,
    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
    #[validate(length(min = 1, message = "An order needs at least one line"))]
    pub lines: Vec<LineRequest>,
}

/// Status axes to change; omitted axes stay as they are
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub supplier_payment_status: Option<SupplierPaymentStatus>,
    pub collection_status: Option<CollectionStatus>,
}

/// Admin verdict on a pending order
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApprovalRequest {
    pub decision: ApprovalDecision,
    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
}

/// Discount asked for by the seller
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DiscountRequestBody {
    /// Percent off the base sale amount, in `(0, 90]`
    #[schema(value_type = String, example = "10")]
    pub percent: Decimal,
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Admin verdict on a pending discount request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DiscountDecisionRequest {
    pub decision: DiscountDecision,
    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Ignored for sellers, who only see their own orders
    pub seller_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub supplier_payment_status: Option<SupplierPaymentStatus>,
    pub collection_status: Option<CollectionStatus>,
    pub approval_status: Option<ApprovalStatus>,
    /// Created at or after
    pub from: Option<DateTime<Utc>>,
    /// Created before
    pub to: Option<DateTime<Utc>>,
}

impl OrderListQuery {
    fn into_parts(self) -> (OrderFilter, PaginationParams) {
        (
            OrderFilter {
                seller_id: self.seller_id,
                customer_id: self.customer_id,
                fulfillment_status: self.fulfillment_status,
                supplier_payment_status: self.supplier_payment_status,
                collection_status: self.collection_status,
                approval_status: self.approval_status,
                from: self.from,
                to: self.to,
            },
            PaginationParams::new(self.page, self.per_page),
        )
    }
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/status", put(update_status))
        .route("/:id/approval", post(decide_approval))
        .route("/:id/discount-request", post(request_discount))
        .route("/:id/discount-decision", post(decide_discount))
}

/// List orders, newest first
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(OrderListQuery),
    responses(
        (status = 200, description = "One page of orders"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Paginated<Order>>> {
    let (filter, params) = query.into_parts();
    let (orders, total) = state
        .order_service
        .list(auth.seller.actor(), filter, params.clone())
        .await?;
    Ok(Json(Paginated::new(orders, &params, total)))
}

/// Price and open an order at the current profiles
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    security(("session_cookie" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, awaiting approval", body = Order),
        (status = 400, description = "Validation error or inactive customer"),
        (status = 404, description = "No active price profile, unpriced product or unknown customer")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<Order>> {
    let order = state
        .order_service
        .create(
            auth.seller.actor(),
            OrderDraft {
                customer_id: payload.customer_id,
                delivery_date: payload.delivery_date,
                note: payload.note,
                lines: payload.lines,
            },
        )
        .await?;
    Ok(Created(order))
}

/// Get an order by id or by code
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(("id" = String, Path, description = "Order ID or code, e.g. DH-20240601-0042")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Another seller's order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(key): Path<String>,
) -> AppResult<Json<Order>> {
    let actor = auth.seller.actor();
    let order = match Uuid::parse_str(&key) {
        Ok(id) => state.order_service.get(actor, id).await?,
        Err(_) => state.order_service.get_by_code(actor, key).await?,
    };
    Ok(Json(order))
}

/// Move one or more status axes
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Empty update or transition not allowed"),
        (status = 403, description = "Another seller's order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .update_status(
            auth.seller.actor(),
            id,
            StatusUpdate {
                fulfillment_status: payload.fulfillment_status,
                supplier_payment_status: payload.supplier_payment_status,
                collection_status: payload.collection_status,
            },
        )
        .await?;
    Ok(Json(order))
}

/// Approve or reject a pending order
#[utoipa::path(
    post,
    path = "/orders/{id}/approval",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Order),
        (status = 400, description = "Order is not awaiting approval"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn decide_approval(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ApprovalRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .decide_approval(auth.seller.actor(), id, payload.decision, payload.note)
        .await?;
    Ok(Json(order))
}

/// Ask for a discount on an order
#[utoipa::path(
    post,
    path = "/orders/{id}/discount-request",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = DiscountRequestBody,
    responses(
        (status = 200, description = "Discount requested", body = Order),
        (status = 400, description = "Invalid percent or order closed for discounts"),
        (status = 403, description = "Another seller's order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn request_discount(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DiscountRequestBody>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .request_discount(auth.seller.actor(), id, payload.percent, payload.reason)
        .await?;
    Ok(Json(order))
}

/// Approve or reject a pending discount
#[utoipa::path(
    post,
    path = "/orders/{id}/discount-decision",
    tag = "Orders",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = DiscountDecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Order),
        (status = 400, description = "No pending discount request"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn decide_discount(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DiscountDecisionRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .decide_discount(auth.seller.actor(), id, payload.decision, payload.note)
        .await?;
    Ok(Json(order))
}
