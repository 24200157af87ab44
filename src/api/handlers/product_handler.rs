//! Product catalog handlers.
//!
//! Every seller can read the catalog; changes are admin only.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::require_admin;
use crate::api::AppState;
use crate::domain::{AuthSession, Product};
use crate::errors::AppResult;
use crate::types::Created;

/// Product name payload for create and rename
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200, message = "Product name must be 1-200 characters"))]
    #[schema(example = "Trà Thái xanh")]
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Hide inactive products (default true; admins may pass false)
    pub active_only: Option<bool>,
}

/// Create product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(rename_product))
        .route("/:id/activate", post(activate_product))
        .route("/:id/deactivate", post(deactivate_product))
}

/// List products
#[utoipa::path(
    get,
    path = "/products",
    tag = "Catalog",
    security(("session_cookie" = [])),
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products ordered by name", body = Vec<Product>),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    // Inactive products are only visible to admins.
    let active_only = query.active_only.unwrap_or(true) || !auth.seller.is_admin();
    let products = state.catalog_service.list_products(active_only).await?;
    Ok(Json(products))
}

/// Get a product
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Catalog",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog_service.get_product(id).await?))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/products",
    tag = "Catalog",
    security(("session_cookie" = [])),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Created<Product>> {
    require_admin(&auth)?;
    let product = state.catalog_service.create_product(payload.name).await?;
    Ok(Created(product))
}

/// Rename a product
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Catalog",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product renamed", body = Product),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Name already used")
    )
)]
pub async fn rename_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Json<Product>> {
    require_admin(&auth)?;
    let product = state.catalog_service.rename_product(id, payload.name).await?;
    Ok(Json(product))
}

/// Make a product available for pricing again
#[utoipa::path(
    post,
    path = "/products/{id}/activate",
    tag = "Catalog",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product activated", body = Product),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn activate_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    require_admin(&auth)?;
    Ok(Json(state.catalog_service.set_product_active(id, true).await?))
}

/// Withdraw a product from new price profiles
#[utoipa::path(
    post,
    path = "/products/{id}/deactivate",
    tag = "Catalog",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deactivated", body = Product),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn deactivate_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    require_admin(&auth)?;
    Ok(Json(state.catalog_service.set_product_active(id, false).await?))
}
