//! Line pricing and order totals.
//!
//! All money and weights are `Decimal`. Discounted unit prices are rounded to
//! two places before line totals are taken; totals are exact sums of lines.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    MAX_DECIMAL_PLACES, MAX_DISCOUNT_PERCENT, MAX_LINE_WEIGHT_KG, MAX_ORDER_LINES,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::price_profile::{PriceProfile, PriceProfileKind};

/// Smallest sellable weight, 0.01 kg.
pub fn min_weight_kg() -> Decimal {
    Decimal::new(1, 2)
}

/// True when `value` needs more than two decimal places.
pub fn exceeds_scale(value: Decimal) -> bool {
    value.normalize().scale() > MAX_DECIMAL_PLACES
}

fn line_amount(weight_kg: Decimal, price_per_kg: Decimal) -> DomainResult<Decimal> {
    weight_kg
        .checked_mul(price_per_kg)
        .ok_or_else(|| DomainError::validation("Line amount is out of range"))
}

/// Requested product and weight, before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub product_id: Uuid,
    #[schema(value_type = String, example = "2.5")]
    pub weight_kg: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    #[schema(value_type = String)]
    pub weight_kg: Decimal,
    #[schema(value_type = String)]
    pub cost_price_per_kg: Decimal,
    /// Price after any approved discount.
    #[schema(value_type = String)]
    pub sale_price_per_kg: Decimal,
    /// Price from the sale profile, kept for audit.
    #[schema(value_type = String)]
    pub base_sale_price_per_kg: Decimal,
    #[schema(value_type = String)]
    pub line_cost_total: Decimal,
    #[schema(value_type = String)]
    pub base_line_sale_total: Decimal,
    #[schema(value_type = String)]
    pub line_sale_total: Decimal,
    #[schema(value_type = String)]
    pub line_profit: Decimal,
}

impl OrderLine {
    fn priced(
        product_id: Uuid,
        product_name: String,
        weight_kg: Decimal,
        cost: Decimal,
        sale: Decimal,
    ) -> DomainResult<Self> {
        let line_cost_total = line_amount(weight_kg, cost)?;
        let line_sale_total = line_amount(weight_kg, sale)?;
        Ok(Self {
            product_id,
            product_name,
            weight_kg,
            cost_price_per_kg: cost,
            sale_price_per_kg: sale,
            base_sale_price_per_kg: sale,
            line_cost_total,
            base_line_sale_total: line_sale_total,
            line_sale_total,
            line_profit: line_sale_total - line_cost_total,
        })
    }

    /// Reprice from the base price with `percent` off.
    fn apply_discount(&mut self, percent: Decimal) -> DomainResult<()> {
        let sale_price = discounted_price(self.base_sale_price_per_kg, percent);
        let line_sale_total = line_amount(self.weight_kg, sale_price)?;
        self.sale_price_per_kg = sale_price;
        self.line_sale_total = line_sale_total;
        self.line_profit = line_sale_total - self.line_cost_total;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[schema(value_type = String)]
    pub total_weight_kg: Decimal,
    #[schema(value_type = String)]
    pub total_cost_amount: Decimal,
    #[schema(value_type = String)]
    pub base_sale_amount: Decimal,
    #[schema(value_type = String)]
    pub total_sale_amount: Decimal,
    #[schema(value_type = String)]
    pub total_profit_amount: Decimal,
}

impl OrderTotals {
    pub fn from_lines(lines: &[OrderLine]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            acc.total_weight_kg += line.weight_kg;
            acc.total_cost_amount += line.line_cost_total;
            acc.base_sale_amount += line.base_line_sale_total;
            acc.total_sale_amount += line.line_sale_total;
            acc.total_profit_amount += line.line_profit;
            acc
        })
    }
}

/// Price every requested line from the current cost and sale profiles.
pub fn build_lines(
    cost: &PriceProfile,
    sale: &PriceProfile,
    requests: &[LineRequest],
) -> DomainResult<Vec<OrderLine>> {
    if requests.is_empty() {
        return Err(DomainError::validation("An order needs at least one line"));
    }
    if requests.len() > MAX_ORDER_LINES {
        return Err(DomainError::validation(format!(
            "An order carries at most {} lines",
            MAX_ORDER_LINES
        )));
    }

    requests
        .iter()
        .map(|request| {
            if request.weight_kg < min_weight_kg() {
                return Err(DomainError::validation(format!(
                    "Weight must be at least {} kg",
                    min_weight_kg()
                )));
            }
            if request.weight_kg > Decimal::from(MAX_LINE_WEIGHT_KG) {
                return Err(DomainError::validation(format!(
                    "Weight must be at most {} kg",
                    MAX_LINE_WEIGHT_KG
                )));
            }
            if exceeds_scale(request.weight_kg) {
                return Err(DomainError::validation(
                    "Weight is limited to two decimal places",
                ));
            }

            let cost_price = cost.price_for(request.product_id).ok_or(
                DomainError::ProductNotPriced {
                    product_id: request.product_id,
                    kind: PriceProfileKind::Cost,
                },
            )?;
            let sale_item = sale
                .items
                .iter()
                .find(|item| item.product_id == request.product_id)
                .ok_or(DomainError::ProductNotPriced {
                    product_id: request.product_id,
                    kind: PriceProfileKind::Sale,
                })?;

            OrderLine::priced(
                request.product_id,
                sale_item.product_name.clone(),
                request.weight_kg,
                cost_price,
                sale_item.price_per_kg,
            )
        })
        .collect()
}

/// Check a discount percent lies in `(0, 90]`.
pub fn validate_discount_percent(percent: Decimal) -> DomainResult<()> {
    if percent <= Decimal::ZERO || percent > Decimal::from(MAX_DISCOUNT_PERCENT) {
        return Err(DomainError::validation(format!(
            "Discount must be greater than 0 and at most {}%",
            MAX_DISCOUNT_PERCENT
        )));
    }
    if exceeds_scale(percent) {
        return Err(DomainError::validation(
            "Discount is limited to two decimal places",
        ));
    }
    Ok(())
}

/// `base * (1 - percent/100)`, rounded half away from zero to 2 places and
/// never above `base`.
pub fn discounted_price(base: Decimal, percent: Decimal) -> Decimal {
    round_money(base * (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED).min(base)
}

/// Amount taken off `base` by `percent`.
pub fn discount_amount(base: Decimal, percent: Decimal) -> Decimal {
    round_money(base * percent / Decimal::ONE_HUNDRED)
}

/// Reprice all lines with `percent` off their base price.
pub fn apply_discount(lines: &mut [OrderLine], percent: Decimal) -> DomainResult<()> {
    lines.iter_mut().try_for_each(|line| line.apply_discount(percent))
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_profile::PriceItem;
    use chrono::Utc;

    fn profile(kind: PriceProfileKind, items: &[(Uuid, i64)]) -> PriceProfile {
        let now = Utc::now();
        PriceProfile {
            id: Uuid::new_v4(),
            kind,
            name: format!("{} profile", kind),
            seller_id: None,
            effective_from: now,
            is_active: true,
            items: items
                .iter()
                .map(|(id, price)| PriceItem {
                    product_id: *id,
                    product_name: "Product A".to_string(),
                    price_per_kg: Decimal::from(*price),
                })
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn line(product_id: Uuid, weight: Decimal) -> LineRequest {
        LineRequest {
            product_id,
            weight_kg: weight,
        }
    }

    #[test]
    fn test_single_line_totals() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 130_000)]);

        let lines = build_lines(&cost, &sale, &[line(a, Decimal::from(2))]).unwrap();
        let totals = OrderTotals::from_lines(&lines);

        assert_eq!(lines[0].line_cost_total, Decimal::from(200_000));
        assert_eq!(lines[0].line_sale_total, Decimal::from(260_000));
        assert_eq!(lines[0].line_profit, Decimal::from(60_000));
        assert_eq!(lines[0].base_sale_price_per_kg, lines[0].sale_price_per_kg);
        assert_eq!(totals.total_sale_amount, Decimal::from(260_000));
        assert_eq!(totals.base_sale_amount, Decimal::from(260_000));
        assert_eq!(totals.total_profit_amount, Decimal::from(60_000));
    }

    #[test]
    fn test_fractional_weights_are_exact() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 100_000), (b, 55_555)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 130_000), (b, 77_777)]);

        let lines = build_lines(
            &cost,
            &sale,
            &[line(a, Decimal::new(15, 1)), line(b, Decimal::new(33, 2))],
        )
        .unwrap();
        let totals = OrderTotals::from_lines(&lines);

        // 1.5 * 130000 + 0.33 * 77777
        assert_eq!(totals.total_sale_amount, Decimal::new(22066641, 2));
        assert_eq!(totals.total_weight_kg, Decimal::new(183, 2));
        assert_eq!(
            totals.total_profit_amount,
            totals.total_sale_amount - totals.total_cost_amount
        );
    }

    #[test]
    fn test_unpriced_product_in_cost_profile() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 130_000)]);

        let err = build_lines(&cost, &sale, &[line(a, Decimal::ONE)]).unwrap_err();
        assert_eq!(
            err,
            DomainError::ProductNotPriced {
                product_id: a,
                kind: PriceProfileKind::Cost
            }
        );
    }

    #[test]
    fn test_unpriced_product_in_sale_profile() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, &[]);

        let err = build_lines(&cost, &sale, &[line(a, Decimal::ONE)]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::ProductNotPriced {
                kind: PriceProfileKind::Sale,
                ..
            }
        ));
    }

    #[test]
    fn test_minimum_weight() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 1)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 2)]);

        assert!(build_lines(&cost, &sale, &[line(a, Decimal::new(1, 2))]).is_ok());
        assert!(build_lines(&cost, &sale, &[line(a, Decimal::new(9, 3))]).is_err());
        assert!(build_lines(&cost, &sale, &[line(a, Decimal::ZERO)]).is_err());
    }

    #[test]
    fn test_empty_order_rejected() {
        let cost = profile(PriceProfileKind::Cost, &[]);
        let sale = profile(PriceProfileKind::Sale, &[]);
        assert!(matches!(
            build_lines(&cost, &sale, &[]),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_discount_keeps_base_and_never_exceeds_it() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 130_000)]);
        let mut lines = build_lines(&cost, &sale, &[line(a, Decimal::from(2))]).unwrap();

        apply_discount(&mut lines, Decimal::from(10)).unwrap();
        let totals = OrderTotals::from_lines(&lines);

        assert_eq!(lines[0].sale_price_per_kg, Decimal::from(117_000));
        assert_eq!(lines[0].base_sale_price_per_kg, Decimal::from(130_000));
        assert!(lines[0].line_sale_total <= lines[0].base_line_sale_total);
        assert_eq!(totals.total_sale_amount, Decimal::from(234_000));
        assert_eq!(totals.total_profit_amount, Decimal::from(34_000));
    }

    #[test]
    fn test_discounted_price_rounds_half_up() {
        // 10.05 * 0.5 = 5.025
        assert_eq!(
            discounted_price(Decimal::new(1005, 2), Decimal::from(50)),
            Decimal::new(503, 2)
        );
        assert_eq!(
            discount_amount(Decimal::from(260_000), Decimal::from(10)),
            Decimal::from(26_000)
        );
    }

    #[test]
    fn test_discounted_price_stays_under_unrounded_base() {
        // 1.009 * 0.9999 rounds to 1.01
        let base = Decimal::new(1009, 3);
        let percent = Decimal::new(1, 2);
        assert!(discounted_price(base, percent) <= base);
        assert_eq!(
            discounted_price(Decimal::ONE, percent),
            Decimal::ONE
        );
    }

    #[test]
    fn test_oversized_weight_is_rejected_not_panicking() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 100_000)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 130_000)]);

        for weight in [Decimal::MAX, Decimal::from(MAX_LINE_WEIGHT_KG + 1)] {
            assert!(matches!(
                build_lines(&cost, &sale, &[line(a, weight)]),
                Err(DomainError::Validation(_))
            ));
        }
        assert!(build_lines(&cost, &sale, &[line(a, Decimal::from(MAX_LINE_WEIGHT_KG))]).is_ok());
    }

    #[test]
    fn test_line_amount_overflow_is_an_error() {
        assert!(line_amount(Decimal::MAX, Decimal::from(2)).is_err());
        assert_eq!(
            line_amount(Decimal::new(25, 1), Decimal::from(4)).unwrap(),
            Decimal::from(10)
        );
    }

    #[test]
    fn test_weight_scale_is_limited() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 1)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 2)]);

        assert!(build_lines(&cost, &sale, &[line(a, Decimal::new(1005, 3))]).is_err());
        // trailing zeros do not count
        assert!(build_lines(&cost, &sale, &[line(a, Decimal::new(1_500, 3))]).is_ok());
    }

    #[test]
    fn test_too_many_lines_rejected() {
        let a = Uuid::new_v4();
        let cost = profile(PriceProfileKind::Cost, &[(a, 1)]);
        let sale = profile(PriceProfileKind::Sale, &[(a, 2)]);
        let requests = vec![line(a, Decimal::ONE); MAX_ORDER_LINES + 1];

        assert!(build_lines(&cost, &sale, &requests).is_err());
    }

    #[test]
    fn test_discount_percent_bounds() {
        assert!(validate_discount_percent(Decimal::new(1005, 3)).is_err());
        assert!(validate_discount_percent(Decimal::new(1050, 3)).is_ok());
        assert!(validate_discount_percent(Decimal::ZERO).is_err());
        assert!(validate_discount_percent(Decimal::from(-5)).is_err());
        assert!(validate_discount_percent(Decimal::new(1, 1)).is_ok());
        assert!(validate_discount_percent(Decimal::from(90)).is_ok());
        assert!(validate_discount_percent(Decimal::new(9001, 2)).is_err());
    }
}
