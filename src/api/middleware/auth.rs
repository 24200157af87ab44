//! Session cookie authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::ACCEPT, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::AppState;
use crate::config::{LOGIN_PATH, SESSION_COOKIE_NAME};
use crate::domain::{AuthSession, SessionGate};
use crate::errors::AppError;

/// Resolve the session cookie and inject the [`AuthSession`] into the
/// request extensions.
///
/// Without a valid session, browser navigations are redirected to the login
/// page and API calls get a 401.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());

    match state.session_manager.require(token.as_deref()).await {
        SessionGate::Authenticated(auth) => {
            request.extensions_mut().insert(auth);
            next.run(request).await
        }
        SessionGate::RedirectRequired => unauthenticated_response(request.headers()),
    }
}

/// Admin gate; must run inside [`session_middleware`].
pub async fn admin_middleware(
    Extension(auth): Extension<AuthSession>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_admin(&auth)?;
    Ok(next.run(request).await)
}

/// 303 to the login page for HTML navigations, 401 JSON otherwise.
pub fn unauthenticated_response(headers: &HeaderMap) -> Response {
    if wants_html(headers) {
        Redirect::to(LOGIN_PATH).into_response()
    } else {
        AppError::Unauthorized.into_response()
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(auth: &AuthSession) -> Result<(), AppError> {
    if auth.seller.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
