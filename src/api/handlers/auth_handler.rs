//! Authentication handlers - login, logout, current seller, password change.

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::UserAgent,
    TypedHeader,
};
use serde::Deserialize;
use std::net::SocketAddr;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::client_ip;
use crate::api::AppState;
use crate::config::{SESSION_COOKIE_NAME, SESSION_TTL_DAYS};
use crate::domain::{AuthSession, ClientContext, SellerResponse};
use crate::errors::AppResult;
use crate::services::LoginResponse;
use crate::types::MessageResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "lan.nguyen")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(
        min = 8,
        message = "New password must be at least 8 characters"
    ))]
    #[schema(min_length = 8)]
    pub new_password: String,
}

/// Public authentication routes (rate limited per client IP)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Routes for the signed-in seller's own account
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Expired cookie that makes the browser drop the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
}

/// Sign in and receive the session cookie
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    user_agent: Option<TypedHeader<UserAgent>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let context = ClientContext {
        user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_string()),
        ip_address: client_ip(&headers, connect_info.as_ref()),
    };

    let outcome = state
        .auth_service
        .login(payload.username, payload.password, context)
        .await?;
    let body = LoginResponse::from(&outcome);

    let jar = jar.add(session_cookie(
        outcome.token.into_string(),
        state.secure_cookies,
    ));
    Ok((jar, Json(body)))
}

/// Sign out; succeeds with or without a session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session closed and cookie cleared", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        state.auth_service.logout(cookie.value()).await?;
    }

    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse::new("Logged out")),
    ))
}

/// The signed-in seller
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current seller", body = SellerResponse),
        (status = 401, description = "No valid session")
    )
)]
pub async fn me(Extension(auth): Extension<AuthSession>) -> Json<SellerResponse> {
    Json(SellerResponse::from(auth.seller))
}

/// Change the caller's password; every session, including this one, ends
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "Authentication",
    security(("session_cookie" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed, sign in again", body = MessageResponse),
        (status = 400, description = "Wrong current password or weak new password"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    state
        .auth_service
        .change_password(
            auth.seller.id,
            payload.current_password,
            payload.new_password,
        )
        .await?;

    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse::new("Password changed, please sign in again")),
    ))
}
