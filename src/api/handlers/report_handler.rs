//! Reporting handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::AppState;
use crate::domain::{AuthSession, DashboardStats, TrendGranularity, TrendWindow};
use crate::errors::{AppError, AppResult};
use crate::services::SellerTrend;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Admins only; sellers always see their own figures
    pub seller_id: Option<Uuid>,
    /// Orders created at or after
    pub from: Option<DateTime<Utc>>,
    /// Orders created before
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    pub granularity: TrendGranularity,
    /// Admins only; sellers always see their own trend
    pub seller_id: Option<Uuid>,
    /// `day`: first date (YYYY-MM-DD); `year`: first year
    pub from: Option<String>,
    /// `day`: last date (YYYY-MM-DD); `year`: last year
    pub to: Option<String>,
    /// `month`: calendar year, defaults to the current one
    pub year: Option<i32>,
}

impl TrendQuery {
    /// Parse the granularity-specific bounds.
    pub fn window(&self) -> AppResult<TrendWindow> {
        match self.granularity {
            TrendGranularity::Day => Ok(TrendWindow::Daily {
                from: parse_bound(self.from.as_deref(), "from", parse_date)?,
                to: parse_bound(self.to.as_deref(), "to", parse_date)?,
            }),
            TrendGranularity::Month => Ok(TrendWindow::Monthly {
                year: self.year.unwrap_or_else(|| Utc::now().year()),
            }),
            TrendGranularity::Year => Ok(TrendWindow::Yearly {
                from: parse_bound(self.from.as_deref(), "from", parse_year)?,
                to: parse_bound(self.to.as_deref(), "to", parse_year)?,
            }),
        }
    }
}

fn parse_bound<T>(
    raw: Option<&str>,
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> AppResult<T> {
    let raw = raw.ok_or_else(|| AppError::validation(format!("'{}' is required", name)))?;
    parse(raw.trim()).ok_or_else(|| AppError::validation(format!("Invalid '{}': {}", name, raw)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_year(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

/// Create report routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/seller-trend", get(seller_trend))
}

/// Dashboard figures over an optional date range
#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "Reports",
    security(("session_cookie" = [])),
    params(DashboardQuery),
    responses(
        (status = 200, description = "Aggregated figures", body = DashboardStats),
        (status = 400, description = "Inverted date range"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardStats>> {
    let stats = state
        .report_service
        .dashboard(auth.seller.actor(), query.seller_id, query.from, query.to)
        .await?;
    Ok(Json(stats))
}

/// Zero-filled order, sale and profit buckets by day, month or year
#[utoipa::path(
    get,
    path = "/reports/seller-trend",
    tag = "Reports",
    security(("session_cookie" = [])),
    params(TrendQuery),
    responses(
        (status = 200, description = "Trend buckets in chronological order", body = SellerTrend),
        (status = 400, description = "Missing or invalid bounds"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn seller_trend(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<TrendQuery>,
) -> AppResult<Json<SellerTrend>> {
    let window = query.window()?;
    let trend = state
        .report_service
        .seller_trend(auth.seller.actor(), query.seller_id, window)
        .await?;
    Ok(Json(trend))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(granularity: TrendGranularity) -> TrendQuery {
        TrendQuery {
            granularity,
            seller_id: None,
            from: None,
            to: None,
            year: None,
        }
    }

    #[test]
    fn test_daily_window_parses_dates() {
        let window = TrendQuery {
            from: Some("2024-06-01".to_string()),
            to: Some("2024-06-30".to_string()),
            ..query(TrendGranularity::Day)
        }
        .window()
        .unwrap();

        assert_eq!(
            window,
            TrendWindow::Daily {
                from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                to: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            }
        );
    }

    #[test]
    fn test_daily_window_requires_bounds() {
        let result = query(TrendGranularity::Day).window();
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = TrendQuery {
            from: Some("01/06/2024".to_string()),
            to: Some("2024-06-30".to_string()),
            ..query(TrendGranularity::Day)
        }
        .window();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_monthly_window_defaults_to_current_year() {
        let window = query(TrendGranularity::Month).window().unwrap();
        assert_eq!(
            window,
            TrendWindow::Monthly {
                year: Utc::now().year()
            }
        );
    }

    #[test]
    fn test_yearly_window_parses_years() {
        let window = TrendQuery {
            from: Some("2022".to_string()),
            to: Some("2024".to_string()),
            ..query(TrendGranularity::Year)
        }
        .window()
        .unwrap();

        assert_eq!(window, TrendWindow::Yearly { from: 2022, to: 2024 });
    }
}
