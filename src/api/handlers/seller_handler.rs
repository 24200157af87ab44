//! Seller administration handlers (admin only).

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{AuthSession, SellerResponse, SellerRole};
use crate::errors::AppResult;
use crate::services::SellerDraft;
use crate::types::Created;

/// New seller account
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellerRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    #[schema(example = "lan.nguyen")]
    pub username: String,
    #[validate(length(min = 1, message = "Display name is required"))]
    #[schema(example = "Lan Nguyen")]
    pub display_name: String,
    /// Temporary password, changed at first login
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: SellerRole,
}

fn default_role() -> SellerRole {
    SellerRole::Seller
}

/// Temporary password set by an admin
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Create seller routes
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sellers).post(create_seller))
        .route("/:id", get(get_seller))
        .route("/:id/enable", post(enable_seller))
        .route("/:id/disable", post(disable_seller))
        .route("/:id/reset-password", post(reset_password))
}

/// List all sellers
#[utoipa::path(
    get,
    path = "/sellers",
    tag = "Sellers",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "All sellers", body = Vec<SellerResponse>),
        (status = 401, description = "No valid session"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_sellers(State(state): State<AppState>) -> AppResult<Json<Vec<SellerResponse>>> {
    let sellers = state.seller_service.list().await?;
    Ok(Json(sellers.into_iter().map(SellerResponse::from).collect()))
}

/// Create a seller account
#[utoipa::path(
    post,
    path = "/sellers",
    tag = "Sellers",
    security(("session_cookie" = [])),
    request_body = CreateSellerRequest,
    responses(
        (status = 201, description = "Seller created", body = SellerResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_seller(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSellerRequest>,
) -> AppResult<Created<SellerResponse>> {
    let seller = state
        .seller_service
        .create(SellerDraft {
            username: payload.username,
            display_name: payload.display_name,
            password: payload.password,
            role: payload.role,
        })
        .await?;

    Ok(Created(SellerResponse::from(seller)))
}

/// Get a seller
#[utoipa::path(
    get,
    path = "/sellers/{id}",
    tag = "Sellers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 200, description = "Seller", body = SellerResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn get_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state.seller_service.get(id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// Allow a seller to sign in again
#[utoipa::path(
    post,
    path = "/sellers/{id}/enable",
    tag = "Sellers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 200, description = "Seller enabled", body = SellerResponse),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn enable_seller(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state.seller_service.enable(id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// Disable a seller and end their sessions
#[utoipa::path(
    post,
    path = "/sellers/{id}/disable",
    tag = "Sellers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Seller ID")),
    responses(
        (status = 200, description = "Seller disabled", body = SellerResponse),
        (status = 400, description = "Cannot disable your own account"),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn disable_seller(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state.seller_service.disable(auth.seller.id, id).await?;
    Ok(Json(SellerResponse::from(seller)))
}

/// Set a temporary password and end the seller's sessions
#[utoipa::path(
    post,
    path = "/sellers/{id}/reset-password",
    tag = "Sellers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Seller ID")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = SellerResponse),
        (status = 400, description = "Weak password"),
        (status = 404, description = "Seller not found")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<SellerResponse>> {
    let seller = state
        .seller_service
        .reset_password(id, payload.new_password)
        .await?;
    Ok(Json(SellerResponse::from(seller)))
}
