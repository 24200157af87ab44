//! Price profile handlers.
//!
//! Profiles are managed by admins. Any seller may read the profiles that
//! currently apply to them.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::require_admin;
use crate::api::AppState;
use crate::domain::{AuthSession, PriceProfile, PriceProfileKind};
use crate::errors::{AppError, AppResult};
use crate::infra::ProfileFilter;
use crate::services::{ItemPrice, ProfileDraft, ProfileUpdate};
use crate::types::Created;

/// One price line of a profile request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPriceRequest {
    pub product_id: Uuid,
    #[schema(value_type = String, example = "130000")]
    pub price_per_kg: Decimal,
}

impl From<ItemPriceRequest> for ItemPrice {
    fn from(item: ItemPriceRequest) -> Self {
        Self {
            product_id: item.product_id,
            price_per_kg: item.price_per_kg,
        }
    }
}

/// New price profile
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceProfileRequest {
    pub kind: PriceProfileKind,
    #[validate(length(min = 1, max = 200, message = "Profile name must be 1-200 characters"))]
    #[schema(example = "Giá bán tháng 6")]
    pub name: String,
    /// Seller the SALE profile applies to; omitted for a global profile
    pub seller_id: Option<Uuid>,
    /// Defaults to now
    pub effective_from: Option<DateTime<Utc>>,
    /// Activate immediately, replacing the active profile of the same scope
    #[serde(default)]
    pub is_active: bool,
    #[validate(length(min = 1, message = "A price profile needs at least one item"))]
    pub items: Vec<ItemPriceRequest>,
}

/// Partial profile update; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriceProfileRequest {
    #[validate(length(min = 1, max = 200, message = "Profile name must be 1-200 characters"))]
    pub name: Option<String>,
    pub effective_from: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "A price profile needs at least one item"))]
    pub items: Option<Vec<ItemPriceRequest>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfileListQuery {
    pub kind: Option<PriceProfileKind>,
    pub seller_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CurrentProfilesQuery {
    /// Seller whose view to resolve (admins only; sellers always get their own)
    pub seller_id: Option<Uuid>,
}

/// Profiles that would price a new order right now
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProfilesResponse {
    /// Only returned to admins
    pub cost: Option<PriceProfile>,
    pub sale: Option<PriceProfile>,
}

/// Create price profile routes
pub fn price_profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profiles).post(create_profile))
        .route("/current", get(current_profiles))
        .route("/:id", get(get_profile).put(update_profile))
        .route("/:id/activate", post(activate_profile))
        .route("/:id/deactivate", post(deactivate_profile))
}

/// Missing active profiles are reported as absent, not as errors.
fn absent_if_missing(result: AppResult<PriceProfile>) -> AppResult<Option<PriceProfile>> {
    match result {
        Ok(profile) => Ok(Some(profile)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// List price profiles
#[utoipa::path(
    get,
    path = "/price-profiles",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(ProfileListQuery),
    responses(
        (status = 200, description = "Matching profiles, newest first", body = Vec<PriceProfile>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<ProfileListQuery>,
) -> AppResult<Json<Vec<PriceProfile>>> {
    require_admin(&auth)?;
    let profiles = state
        .catalog_service
        .list_profiles(ProfileFilter {
            kind: query.kind,
            seller_id: query.seller_id,
            is_active: query.is_active,
        })
        .await?;
    Ok(Json(profiles))
}

/// Active profiles applying to a seller
#[utoipa::path(
    get,
    path = "/price-profiles/current",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(CurrentProfilesQuery),
    responses(
        (status = 200, description = "Current cost (admins) and sale profiles", body = CurrentProfilesResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn current_profiles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<CurrentProfilesQuery>,
) -> AppResult<Json<CurrentProfilesResponse>> {
    let actor = auth.seller.actor();
    let seller_id = if actor.is_admin() {
        query.seller_id
    } else {
        Some(actor.seller_id)
    };

    let catalog = &state.catalog_service;
    let sale = absent_if_missing(catalog.current_sale_profile(seller_id).await)?;
    let cost = if actor.is_admin() {
        absent_if_missing(catalog.current_cost_profile().await)?
    } else {
        None
    };

    Ok(Json(CurrentProfilesResponse { cost, sale }))
}

/// Get a price profile
#[utoipa::path(
    get,
    path = "/price-profiles/{id}",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Price profile ID")),
    responses(
        (status = 200, description = "Price profile", body = PriceProfile),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Price profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PriceProfile>> {
    require_admin(&auth)?;
    Ok(Json(state.catalog_service.get_profile(id).await?))
}

/// Create a price profile
#[utoipa::path(
    post,
    path = "/price-profiles",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    request_body = CreatePriceProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = PriceProfile),
        (status = 400, description = "Invalid items or scope"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown product or seller")
    )
)]
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    ValidatedJson(payload): ValidatedJson<CreatePriceProfileRequest>,
) -> AppResult<Created<PriceProfile>> {
    require_admin(&auth)?;
    let profile = state
        .catalog_service
        .create_profile(ProfileDraft {
            kind: payload.kind,
            name: payload.name,
            seller_id: payload.seller_id,
            effective_from: payload.effective_from,
            is_active: payload.is_active,
            items: payload.items.into_iter().map(ItemPrice::from).collect(),
        })
        .await?;
    Ok(Created(profile))
}

/// Update a price profile
#[utoipa::path(
    put,
    path = "/price-profiles/{id}",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Price profile ID")),
    request_body = UpdatePriceProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = PriceProfile),
        (status = 400, description = "Invalid items"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Price profile not found")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePriceProfileRequest>,
) -> AppResult<Json<PriceProfile>> {
    require_admin(&auth)?;
    let profile = state
        .catalog_service
        .update_profile(
            id,
            ProfileUpdate {
                name: payload.name,
                effective_from: payload.effective_from,
                items: payload
                    .items
                    .map(|items| items.into_iter().map(ItemPrice::from).collect()),
            },
        )
        .await?;
    Ok(Json(profile))
}

/// Activate a profile, deactivating the previous one of its scope
#[utoipa::path(
    post,
    path = "/price-profiles/{id}/activate",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Price profile ID")),
    responses(
        (status = 200, description = "Profile activated", body = PriceProfile),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Price profile not found")
    )
)]
pub async fn activate_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PriceProfile>> {
    require_admin(&auth)?;
    Ok(Json(state.catalog_service.activate_profile(id).await?))
}

/// Deactivate a profile
#[utoipa::path(
    post,
    path = "/price-profiles/{id}/deactivate",
    tag = "Price Profiles",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Price profile ID")),
    responses(
        (status = 200, description = "Profile deactivated", body = PriceProfile),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Price profile not found")
    )
)]
pub async fn deactivate_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PriceProfile>> {
    require_admin(&auth)?;
    Ok(Json(state.catalog_service.deactivate_profile(id).await?))
}
