//! Customer registry handlers.

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
use crate::domain::{AuthSession, Customer, CustomerChanges, NewCustomer};
use crate::errors::AppResult;
use crate::infra::CustomerFilter;
use crate::types::{Created, Paginated, PaginationParams};

/// New customer
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Customer name must be 1-200 characters"))]
    #[schema(example = "Chị Hoa")]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    #[schema(example = "0912345678")]
    pub phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub notes: Option<String>,
}

/// Partial customer update; omitted fields stay unchanged, an empty email
/// or notes clears it
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Customer name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl UpdateCustomerRequest {
    fn email_is_valid(&self) -> bool {
        use validator::ValidateEmail;

        match self.email.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(email) => email.validate_email(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches name or phone
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create customer routes
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).put(update_customer))
        .route("/:id/deactivate", post(deactivate_customer))
}

/// List customers
#[utoipa::path(
    get,
    path = "/customers",
    tag = "Customers",
    security(("session_cookie" = [])),
    params(CustomerListQuery),
    responses(
        (status = 200, description = "One page of customers ordered by name"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> AppResult<Json<Paginated<Customer>>> {
    let params = PaginationParams::new(query.page, query.per_page);
    let filter = CustomerFilter {
        search: query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        include_inactive: query.include_inactive,
    };

    let (customers, total) = state
        .customer_service
        .list(filter, params.clone())
        .await?;
    Ok(Json(Paginated::new(customers, &params, total)))
}

/// Get a customer
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "Customers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    Ok(Json(state.customer_service.get(id).await?))
}

/// Register a customer
#[utoipa::path(
    post,
    path = "/customers",
    tag = "Customers",
    security(("session_cookie" = [])),
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCustomerRequest>,
) -> AppResult<Created<Customer>> {
    let customer = state
        .customer_service
        .create(NewCustomer {
            name: payload.name,
            phone: payload.phone,
            email: payload.email,
            notes: payload.notes,
        })
        .await?;
    Ok(Created(customer))
}

/// Update a customer
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "Customers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCustomerRequest>,
) -> AppResult<Json<Customer>> {
    if !payload.email_is_valid() {
        return Err(crate::errors::AppError::validation("Invalid email format"));
    }

    let customer = state
        .customer_service
        .update(
            id,
            CustomerChanges {
                name: payload.name,
                phone: payload.phone,
                email: payload.email,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(customer))
}

/// Deactivate a customer; past orders keep referring to them
#[utoipa::path(
    post,
    path = "/customers/{id}/deactivate",
    tag = "Customers",
    security(("session_cookie" = [])),
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deactivated", body = Customer),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn deactivate_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    require_admin(&auth)?;
    Ok(Json(state.customer_service.deactivate(id).await?))
}
