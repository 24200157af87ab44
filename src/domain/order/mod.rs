//! Order aggregate.
//!
//! An order is priced once from frozen profile snapshots. Afterwards only the
//! status axes, the approval decision and the discount request change it.

pub mod code;
pub mod pricing;
pub mod status;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::{DomainError, DomainResult};
use super::price_profile::ProfileSnapshot;

pub use pricing::{LineRequest, OrderLine, OrderTotals};
pub use status::{
    ApprovalDecision, ApprovalStatus, CollectionStatus, DiscountDecision, DiscountStatus,
    FulfillmentStatus, SupplierPaymentStatus,
};

/// Admin review of the order itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub requires_admin_approval: bool,
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub note: Option<String>,
}

/// Seller-initiated discount awaiting or past admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    pub status: DiscountStatus,
    #[schema(value_type = Option<String>)]
    pub percent: Option<Decimal>,
    /// Amount taken off the base sale amount.
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    /// Base sale amount minus `amount`.
    #[schema(value_type = Option<String>)]
    pub sale_amount: Option<Decimal>,
    pub reason: Option<String>,
    pub requested_by: Option<Uuid>,
    pub requested_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
}

impl DiscountRequest {
    pub fn none() -> Self {
        Self {
            status: DiscountStatus::NotRequested,
            percent: None,
            amount: None,
            sale_amount: None,
            reason: None,
            requested_by: None,
            requested_at: None,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DiscountStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = "DH-20240309-0427")]
    pub code: String,
    pub seller_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub delivery_date: NaiveDate,
    pub note: Option<String>,
    pub cost_profile: ProfileSnapshot,
    pub sale_profile: ProfileSnapshot,
    pub items: Vec<OrderLine>,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub fulfillment_status: FulfillmentStatus,
    pub supplier_payment_status: SupplierPaymentStatus,
    pub collection_status: CollectionStatus,
    pub approval: Approval,
    pub discount_request: DiscountRequest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to open an order once its lines are priced.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub code: String,
    pub seller_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub delivery_date: NaiveDate,
    pub note: Option<String>,
    pub cost_profile: ProfileSnapshot,
    pub sale_profile: ProfileSnapshot,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Open a new order awaiting admin approval.
    pub fn new(new: NewOrder, now: DateTime<Utc>) -> Self {
        let totals = OrderTotals::from_lines(&new.items);
        Self {
            id: Uuid::new_v4(),
            code: new.code,
            seller_id: new.seller_id,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            delivery_date: new.delivery_date,
            note: new.note,
            cost_profile: new.cost_profile,
            sale_profile: new.sale_profile,
            items: new.items,
            totals,
            fulfillment_status: FulfillmentStatus::PendingApproval,
            supplier_payment_status: SupplierPaymentStatus::UnpaidSupplier,
            collection_status: CollectionStatus::Unpaid,
            approval: Approval {
                requires_admin_approval: true,
                status: ApprovalStatus::Pending,
                requested_at: now,
                reviewed_at: None,
                reviewed_by: None,
                note: None,
            },
            discount_request: DiscountRequest::none(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.fulfillment_status.is_canceled()
    }

    /// Set the fulfillment stage directly.
    ///
    /// Re-applying the current stage only refreshes `updated_at`.
    pub fn set_fulfillment_status(
        &mut self,
        next: FulfillmentStatus,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.fulfillment_status.can_transition_to(next) {
            return Err(DomainError::transition(format!(
                "Cannot move order {} from {} to {}",
                self.code, self.fulfillment_status, next
            )));
        }
        self.fulfillment_status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_supplier_payment_status(
        &mut self,
        next: SupplierPaymentStatus,
        now: DateTime<Utc>,
    ) {
        self.supplier_payment_status = next;
        self.updated_at = now;
    }

    pub fn set_collection_status(&mut self, next: CollectionStatus, now: DateTime<Utc>) {
        self.collection_status = next;
        self.updated_at = now;
    }

    /// Record the admin verdict on a pending order.
    ///
    /// Rejecting an order also cancels it and rejects any pending discount.
    pub fn decide_approval(
        &mut self,
        decision: ApprovalDecision,
        reviewer: Uuid,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.approval.status != ApprovalStatus::Pending {
            return Err(DomainError::transition(format!(
                "Order {} has already been {}",
                self.code,
                self.approval.status.as_str().to_lowercase()
            )));
        }
        if self.is_canceled() {
            return Err(DomainError::transition(format!(
                "Order {} has been canceled",
                self.code
            )));
        }

        match decision {
            ApprovalDecision::ApproveOrder => self.approve(),
            ApprovalDecision::ApproveWithDiscount => {
                if !self.discount_request.is_pending() {
                    return Err(DomainError::transition(format!(
                        "Order {} has no pending discount request",
                        self.code
                    )));
                }
                self.decide_discount(DiscountDecision::Approved, reviewer, note.clone(), now)?;
                self.approve();
            }
            ApprovalDecision::ApproveWithoutDiscount => {
                if self.discount_request.is_pending() {
                    self.decide_discount(DiscountDecision::Rejected, reviewer, note.clone(), now)?;
                }
                self.approve();
            }
            ApprovalDecision::RejectOrder => {
                if self.discount_request.is_pending() {
                    self.decide_discount(DiscountDecision::Rejected, reviewer, note.clone(), now)?;
                }
                self.approval.status = ApprovalStatus::Rejected;
                self.fulfillment_status = FulfillmentStatus::Canceled;
            }
        }

        self.approval.reviewed_by = Some(reviewer);
        self.approval.reviewed_at = Some(now);
        self.approval.note = note;
        self.updated_at = now;
        Ok(())
    }

    fn approve(&mut self) {
        self.approval.status = ApprovalStatus::Approved;
        self.fulfillment_status = FulfillmentStatus::Confirmed;
    }

    /// Ask for `percent` off the base sale amount.
    pub fn request_discount(
        &mut self,
        requested_by: Uuid,
        percent: Decimal,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_canceled() || self.approval.status == ApprovalStatus::Rejected {
            return Err(DomainError::transition(format!(
                "Order {} is closed for discounts",
                self.code
            )));
        }
        match self.discount_request.status {
            DiscountStatus::NotRequested | DiscountStatus::Rejected => {}
            status => {
                return Err(DomainError::transition(format!(
                    "Order {} already has a {} discount request",
                    self.code,
                    status.as_str().to_lowercase()
                )))
            }
        }
        pricing::validate_discount_percent(percent)?;

        let base = self.totals.base_sale_amount;
        let amount = pricing::discount_amount(base, percent);
        self.discount_request = DiscountRequest {
            status: DiscountStatus::Pending,
            percent: Some(percent),
            amount: Some(amount),
            sale_amount: Some(base - amount),
            reason,
            requested_by: Some(requested_by),
            requested_at: Some(now),
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
        };
        self.updated_at = now;
        Ok(())
    }

    /// Approve or reject the pending discount.
    ///
    /// Approval reprices every line from its base price; rejection leaves
    /// prices untouched.
    pub fn decide_discount(
        &mut self,
        decision: DiscountDecision,
        reviewer: Uuid,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if !self.discount_request.is_pending() {
            return Err(DomainError::transition(format!(
                "Order {} has no pending discount request",
                self.code
            )));
        }

        match decision {
            DiscountDecision::Approved => {
                let percent = self.discount_request.percent.ok_or_else(|| {
                    DomainError::validation("Pending discount request has no percent")
                })?;
                let mut items = self.items.clone();
                pricing::apply_discount(&mut items, percent)?;
                self.totals = OrderTotals::from_lines(&items);
                self.items = items;
                self.discount_request.status = DiscountStatus::Approved;
            }
            DiscountDecision::Rejected => {
                self.discount_request.status = DiscountStatus::Rejected;
            }
        }

        self.discount_request.reviewed_by = Some(reviewer);
        self.discount_request.reviewed_at = Some(now);
        self.discount_request.review_note = note;
        self.updated_at = now;
        Ok(())
    }
}
