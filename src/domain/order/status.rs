//! Order status axes and review enums.
//!
//! Fulfillment:
//! ```text
//! PENDING_APPROVAL ──(approval)──► CONFIRMED ◄─► PICKED ◄─► DELIVERING ◄─► DELIVERED
//!        │                              │           │            │
//!        └──────────────────────────────┴───────────┴────────────┴──► CANCELED
//! ```
//! Supplier payment and collection have no transition rules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Declares a wire-string enum with `as_str`, `parse`, `ALL` and `Display`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Delivery workflow stage.
    pub enum FulfillmentStatus {
        PendingApproval => "PENDING_APPROVAL",
        Confirmed => "CONFIRMED",
        Picked => "PICKED",
        Delivering => "DELIVERING",
        Delivered => "DELIVERED",
        Canceled => "CANCELED",
    }
}

impl FulfillmentStatus {
    /// Whether a direct status update may move from `self` to `next`.
    ///
    /// Leaving PENDING_APPROVAL for anything but CANCELED goes through the
    /// approval decision instead.
    pub fn can_transition_to(&self, next: FulfillmentStatus) -> bool {
        use FulfillmentStatus::*;

        if *self == next {
            return true;
        }
        match (*self, next) {
            (_, PendingApproval) => false,
            (Canceled, _) => false,
            (Delivered, Canceled) => false,
            (PendingApproval, Canceled) => true,
            (PendingApproval, _) => false,
            _ => true,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, FulfillmentStatus::Canceled)
    }
}

string_enum! {
    /// Capital cycle: has the supplier been paid and the capital recovered.
    pub enum SupplierPaymentStatus {
        UnpaidSupplier => "UNPAID_SUPPLIER",
        SupplierPaid => "SUPPLIER_PAID",
        CapitalCycleCompleted => "CAPITAL_CYCLE_COMPLETED",
    }
}

string_enum! {
    /// Customer payment tracking.
    pub enum CollectionStatus {
        Unpaid => "UNPAID",
        PartiallyPaid => "PARTIALLY_PAID",
        PaidInFull => "PAID_IN_FULL",
        Refunded => "REFUNDED",
    }
}

string_enum! {
    pub enum ApprovalStatus {
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    pub enum DiscountStatus {
        NotRequested => "NONE",
        Pending => "PENDING",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}

string_enum! {
    /// Admin verdict on an order awaiting approval.
    pub enum ApprovalDecision {
        ApproveOrder => "APPROVE_ORDER",
        ApproveWithDiscount => "APPROVE_WITH_DISCOUNT",
        ApproveWithoutDiscount => "APPROVE_WITHOUT_DISCOUNT",
        RejectOrder => "REJECT_ORDER",
    }
}

string_enum! {
    /// Admin verdict on a pending discount request.
    pub enum DiscountDecision {
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
}
