use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;

use crate::database::AppState;
use crate::error::AppError;
use crate::model::CurrentUser;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "sessionid";

/// Middleware guarding the admin API
///
/// The request must carry an `Authorization` header equal to the configured
/// admin secret. Without a configured secret every admin request is rejected.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(secret) = state.config.admin_token.as_deref() else {
        return Err(AppError::Unauthorized);
    };

    match headers.get("Authorization").map(|value| value.to_str()) {
        Some(Ok(header)) if header == secret => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized),
    }
}

/// Resolves the session cookie and stores the [`CurrentUser`] in the request
/// extensions. Requests without a valid session continue anonymously.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match state.store.resolve_session(cookie.value()) {
            Ok(Some(user)) => {
                request.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session"),
            Err(e) => tracing::warn!("Session lookup failed: {}", e),
        }
    }

    next.run(request).await
}

/// Sends anonymous callers to the login page, remembering where they were going
pub async fn require_login(
    user: Option<Extension<CurrentUser>>,
    request: Request,
    next: Next,
) -> Response {
    if user.is_some() {
        return next.run(request).await;
    }

    let target = urlencoding::encode(request.uri().path());
    Redirect::to(&format!("/login?next={target}")).into_response()
}
