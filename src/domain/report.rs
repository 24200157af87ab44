//! Read-side aggregation over orders: dashboard figures and trend series.
//!
//! Canceled orders count in the status breakdowns but never in money totals,
//! order counts or trend buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{DomainError, DomainResult};
use super::order::{
    ApprovalStatus, CollectionStatus, DiscountStatus, FulfillmentStatus, SupplierPaymentStatus,
};
use crate::config::{MAX_DAILY_TREND_DAYS, MAX_YEARLY_TREND_YEARS};

/// The columns of an order that reporting needs.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFigures {
    pub created_at: DateTime<Utc>,
    pub fulfillment_status: FulfillmentStatus,
    pub supplier_payment_status: SupplierPaymentStatus,
    pub collection_status: CollectionStatus,
    pub approval_status: ApprovalStatus,
    pub discount_status: DiscountStatus,
    pub total_weight_kg: Decimal,
    pub total_cost_amount: Decimal,
    pub total_sale_amount: Decimal,
    pub total_profit_amount: Decimal,
}

impl OrderFigures {
    fn counts_toward_totals(&self) -> bool {
        !self.fulfillment_status.is_canceled()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Orders that are not canceled.
    pub order_count: u64,
    #[schema(value_type = String)]
    pub total_weight_kg: Decimal,
    #[schema(value_type = String)]
    pub total_cost_amount: Decimal,
    #[schema(value_type = String)]
    pub total_sale_amount: Decimal,
    #[schema(value_type = String)]
    pub total_profit_amount: Decimal,
    pub fulfillment: Vec<StatusCount>,
    pub supplier_payment: Vec<StatusCount>,
    pub collection: Vec<StatusCount>,
    pub pending_approvals: u64,
    pub pending_discount_requests: u64,
}

fn zeroed<S: Copy + ToString>(all: &[S]) -> Vec<StatusCount> {
    all.iter()
        .map(|s| StatusCount {
            status: s.to_string(),
            count: 0,
        })
        .collect()
}

fn bump(counts: &mut [StatusCount], status: &str) {
    if let Some(entry) = counts.iter_mut().find(|c| c.status == status) {
        entry.count += 1;
    }
}

impl DashboardStats {
    /// Aggregate dashboard figures. Every status appears, zero or not.
    pub fn from_figures(figures: &[OrderFigures]) -> Self {
        let mut stats = Self {
            order_count: 0,
            total_weight_kg: Decimal::ZERO,
            total_cost_amount: Decimal::ZERO,
            total_sale_amount: Decimal::ZERO,
            total_profit_amount: Decimal::ZERO,
            fulfillment: zeroed(FulfillmentStatus::ALL),
            supplier_payment: zeroed(SupplierPaymentStatus::ALL),
            collection: zeroed(CollectionStatus::ALL),
            pending_approvals: 0,
            pending_discount_requests: 0,
        };

        for f in figures {
            bump(&mut stats.fulfillment, f.fulfillment_status.as_str());
            bump(&mut stats.supplier_payment, f.supplier_payment_status.as_str());
            bump(&mut stats.collection, f.collection_status.as_str());

            if f.discount_status == DiscountStatus::Pending {
                stats.pending_discount_requests += 1;
            }
            if !f.counts_toward_totals() {
                continue;
            }
            if f.approval_status == ApprovalStatus::Pending {
                stats.pending_approvals += 1;
            }
            stats.order_count += 1;
            stats.total_weight_kg += f.total_weight_kg;
            stats.total_cost_amount += f.total_cost_amount;
            stats.total_sale_amount += f.total_sale_amount;
            stats.total_profit_amount += f.total_profit_amount;
        }
        stats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendGranularity {
    Day,
    Month,
    Year,
}

/// Period covered by a trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendWindow {
    /// Inclusive date range, one bucket per day.
    Daily { from: NaiveDate, to: NaiveDate },
    /// Twelve monthly buckets.
    Monthly { year: i32 },
    /// Inclusive year range, one bucket per year.
    Yearly { from: i32, to: i32 },
}

impl TrendWindow {
    pub fn granularity(&self) -> TrendGranularity {
        match self {
            TrendWindow::Daily { .. } => TrendGranularity::Day,
            TrendWindow::Monthly { .. } => TrendGranularity::Month,
            TrendWindow::Yearly { .. } => TrendGranularity::Year,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        match *self {
            TrendWindow::Daily { from, to } => {
                if to < from {
                    return Err(DomainError::validation("'to' must not be before 'from'"));
                }
                if to.succ_opt().is_none() {
                    return Err(DomainError::validation("Invalid date"));
                }
                if (to - from).num_days() + 1 > MAX_DAILY_TREND_DAYS {
                    return Err(DomainError::validation(format!(
                        "Daily trend covers at most {} days",
                        MAX_DAILY_TREND_DAYS
                    )));
                }
            }
            TrendWindow::Monthly { year } => {
                if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                    return Err(DomainError::validation("Invalid year"));
                }
            }
            TrendWindow::Yearly { from, to } => {
                if to < from {
                    return Err(DomainError::validation("'to' must not be before 'from'"));
                }
                if i64::from(to) - i64::from(from) + 1 > i64::from(MAX_YEARLY_TREND_YEARS) {
                    return Err(DomainError::validation(format!(
                        "Yearly trend covers at most {} years",
                        MAX_YEARLY_TREND_YEARS
                    )));
                }
                if NaiveDate::from_ymd_opt(from, 1, 1).is_none()
                    || to
                        .checked_add(1)
                        .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
                        .is_none()
                {
                    return Err(DomainError::validation("Invalid year"));
                }
            }
        }
        Ok(())
    }

    /// Half-open `[start, end)` instant range covered by the window.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = match *self {
            TrendWindow::Daily { from, to } => (from, to + Duration::days(1)),
            TrendWindow::Monthly { year } => (first_of_year(year), first_of_year(year + 1)),
            TrendWindow::Yearly { from, to } => (first_of_year(from), first_of_year(to + 1)),
        };
        (midnight(start), midnight(end))
    }

    /// Bucket labels in order: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub fn bucket_keys(&self) -> Vec<String> {
        match *self {
            TrendWindow::Daily { from, to } => from
                .iter_days()
                .take_while(|d| *d <= to)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            TrendWindow::Monthly { year } => {
                (1..=12).map(|m| format!("{:04}-{:02}", year, m)).collect()
            }
            TrendWindow::Yearly { from, to } => (from..=to).map(|y| format!("{:04}", y)).collect(),
        }
    }

    fn key_for(&self, at: DateTime<Utc>) -> String {
        match self {
            TrendWindow::Daily { .. } => at.format("%Y-%m-%d").to_string(),
            TrendWindow::Monthly { .. } => format!("{:04}-{:02}", at.year(), at.month()),
            TrendWindow::Yearly { .. } => format!("{:04}", at.year()),
        }
    }
}

fn first_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MAX)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendBucket {
    #[schema(example = "2024-03")]
    pub period: String,
    pub order_count: u64,
    #[schema(value_type = String)]
    pub sale_amount: Decimal,
    #[schema(value_type = String)]
    pub profit_amount: Decimal,
}

/// Zero-filled trend series for `window`. Orders outside it are ignored.
pub fn build_trend(window: &TrendWindow, figures: &[OrderFigures]) -> Vec<TrendBucket> {
    let (start, end) = window.bounds();
    let mut buckets: BTreeMap<String, TrendBucket> = window
        .bucket_keys()
        .into_iter()
        .map(|key| {
            (
                key.clone(),
                TrendBucket {
                    period: key,
                    order_count: 0,
                    sale_amount: Decimal::ZERO,
                    profit_amount: Decimal::ZERO,
                },
            )
        })
        .collect();

    for f in figures
        .iter()
        .filter(|f| f.counts_toward_totals())
        .filter(|f| f.created_at >= start && f.created_at < end)
    {
        if let Some(bucket) = buckets.get_mut(&window.key_for(f.created_at)) {
            bucket.order_count += 1;
            bucket.sale_amount += f.total_sale_amount;
            bucket.profit_amount += f.total_profit_amount;
        }
    }

    // Keys are zero-padded, so map order is chronological.
    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figures(at: DateTime<Utc>, status: FulfillmentStatus, sale: i64, profit: i64) -> OrderFigures {
        OrderFigures {
            created_at: at,
            fulfillment_status: status,
            supplier_payment_status: SupplierPaymentStatus::UnpaidSupplier,
            collection_status: CollectionStatus::Unpaid,
            approval_status: ApprovalStatus::Pending,
            discount_status: DiscountStatus::NotRequested,
            total_weight_kg: Decimal::from(2),
            total_cost_amount: Decimal::from(sale - profit),
            total_sale_amount: Decimal::from(sale),
            total_profit_amount: Decimal::from(profit),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn count(counts: &[StatusCount], status: &str) -> u64 {
        counts
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.count)
            .unwrap()
    }

    #[test]
    fn test_empty_dashboard_is_zeroed() {
        let stats = DashboardStats::from_figures(&[]);

        assert_eq!(stats.order_count, 0);
        assert_eq!(stats.total_sale_amount, Decimal::ZERO);
        assert_eq!(stats.fulfillment.len(), 6);
        assert_eq!(stats.supplier_payment.len(), 3);
        assert_eq!(stats.collection.len(), 4);
        assert!(stats.fulfillment.iter().all(|c| c.count == 0));
    }

    #[test]
    fn test_canceled_counted_by_status_only() {
        let mut pending_discount = figures(at(2024, 1, 1), FulfillmentStatus::Confirmed, 100, 10);
        pending_discount.discount_status = DiscountStatus::Pending;
        pending_discount.approval_status = ApprovalStatus::Approved;
        let stats = DashboardStats::from_figures(&[
            figures(at(2024, 1, 1), FulfillmentStatus::PendingApproval, 260_000, 60_000),
            figures(at(2024, 1, 2), FulfillmentStatus::Canceled, 999, 999),
            pending_discount,
        ]);

        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.total_sale_amount, Decimal::from(260_100));
        assert_eq!(stats.total_profit_amount, Decimal::from(60_010));
        assert_eq!(count(&stats.fulfillment, "CANCELED"), 1);
        assert_eq!(count(&stats.fulfillment, "PENDING_APPROVAL"), 1);
        assert_eq!(count(&stats.collection, "UNPAID"), 3);
        assert_eq!(stats.pending_approvals, 1);
        assert_eq!(stats.pending_discount_requests, 1);
    }

    #[test]
    fn test_daily_trend_zero_fills() {
        let window = TrendWindow::Daily {
            from: NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        let trend = build_trend(
            &window,
            &[
                figures(at(2024, 2, 28), FulfillmentStatus::Confirmed, 100, 20),
                figures(at(2024, 2, 28), FulfillmentStatus::Delivered, 50, 5),
                figures(at(2024, 2, 28), FulfillmentStatus::Canceled, 70, 7),
                figures(at(2024, 3, 2), FulfillmentStatus::Confirmed, 1, 1),
            ],
        );

        let periods: Vec<_> = trend.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(trend[1].order_count, 2);
        assert_eq!(trend[1].sale_amount, Decimal::from(150));
        assert_eq!(trend[1].profit_amount, Decimal::from(25));
        assert_eq!(trend[0].order_count, 0);
        assert_eq!(trend[3].order_count, 0);
    }

    #[test]
    fn test_monthly_trend_has_twelve_buckets() {
        let window = TrendWindow::Monthly { year: 2024 };
        let trend = build_trend(
            &window,
            &[
                figures(at(2024, 3, 9), FulfillmentStatus::Confirmed, 10, 1),
                figures(at(2023, 12, 31), FulfillmentStatus::Confirmed, 10, 1),
            ],
        );

        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].period, "2024-01");
        assert_eq!(trend[2].order_count, 1);
        assert_eq!(trend.iter().map(|b| b.order_count).sum::<u64>(), 1);
    }

    #[test]
    fn test_yearly_trend() {
        let window = TrendWindow::Yearly {
            from: 2022,
            to: 2024,
        };
        let trend = build_trend(
            &window,
            &[figures(at(2023, 6, 1), FulfillmentStatus::Delivered, 10, 3)],
        );

        let periods: Vec<_> = trend.iter().map(|b| b.period.clone()).collect();
        assert_eq!(periods, ["2022", "2023", "2024"]);
        assert_eq!(trend[1].profit_amount, Decimal::from(3));
    }

    #[test]
    fn test_window_validation() {
        let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();

        assert!(TrendWindow::Daily { from: d(3, 2), to: d(3, 1) }.validate().is_err());
        assert!(TrendWindow::Daily { from: d(1, 1), to: d(12, 31) }.validate().is_ok());
        assert!(TrendWindow::Daily {
            from: d(1, 1),
            to: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        }
        .validate()
        .is_err());
        assert!(TrendWindow::Yearly { from: 2000, to: 2019 }.validate().is_ok());
        assert!(TrendWindow::Yearly { from: 2000, to: 2020 }.validate().is_err());
    }

    #[test]
    fn test_extreme_years_are_rejected() {
        let extremes = [
            (i32::MIN, i32::MAX),
            (i32::MAX, i32::MAX),
            (i32::MAX - 1, i32::MAX),
            (i32::MIN, i32::MIN),
        ];
        for (from, to) in extremes {
            assert!(matches!(
                TrendWindow::Yearly { from, to }.validate(),
                Err(DomainError::Validation(_))
            ));
        }
        assert!(TrendWindow::Monthly { year: i32::MAX }.validate().is_err());
        assert!(TrendWindow::Daily {
            from: NaiveDate::MAX,
            to: NaiveDate::MAX
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_bounds_are_half_open() {
        let window = TrendWindow::Monthly { year: 2024 };
        let (start, end) = window.bounds();

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
