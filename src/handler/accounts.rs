//! Registration, login and logout
//!
//! A successful login stores a server-side session and hands its token to the
//! client in the `sessionid` cookie.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, verify_password};
use crate::database::AppState;
use crate::error::{AppError, Result};
use crate::middleware::SESSION_COOKIE;
use crate::model::{CurrentUser, FlashMessage};
use crate::validation::{invalid_login, safe_next, LoginForm, RegisterForm};

#[derive(Deserialize, Default)]
pub struct NextParams {
    pub next: Option<String>,
}

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Starts a session for `user_id`, dropping the one the cookie jar held before.
/// Returns the updated jar and the new session token.
fn start_session(state: &AppState, jar: CookieJar, user_id: &str) -> Result<(CookieJar, String)> {
    if let Some(previous) = jar.get(SESSION_COOKIE) {
        state.store.delete_session(previous.value())?;
    }

    let token = state
        .store
        .create_session(user_id, state.config.session_ttl_hours)?;
    let jar = jar.add(session_cookie(token.clone(), state.config.cookie_secure));
    Ok((jar, token))
}

pub async fn register_form(user: Option<Extension<CurrentUser>>) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    Json(json!({
        "form": { "username": "", "password1": "", "password2": "" }
    }))
    .into_response()
}

/// Creates an account and logs it in. Already authenticated callers are sent
/// home without any action.
pub async fn register(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let (username, password) = form.validate()?;
    let user = state
        .store
        .create_user(&username, hash_password(&password)?)?;
    tracing::info!("Registered user {}", user.username);

    let (jar, session) = start_session(&state, jar, &user.id)?;
    state.store.push_message(
        &session,
        FlashMessage::success(format!(
            "Welcome {}! Your account has been created.",
            user.username
        )),
    )?;

    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn login_form(Query(params): Query<NextParams>) -> Json<Value> {
    Json(json!({
        "form": { "username": "", "password": "", "next": params.next }
    }))
}

/// Checks credentials and opens a session, then follows `next` if it is a
/// local path
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    form.check_present()?;

    let user = state
        .store
        .find_user_by_username(form.username.trim())?
        .filter(|user| verify_password(&form.password, &user.password_hash));

    let Some(user) = user else {
        tracing::warn!("Failed login for {}", form.username.trim());
        return Err(AppError::Validation(invalid_login()));
    };

    let (jar, _) = start_session(&state, jar, &user.id)?;
    tracing::info!("User {} logged in", user.username);

    let target = safe_next(form.next.as_deref()).to_string();
    Ok((jar, Redirect::to(&target)).into_response())
}

/// Ends the session (if any) and clears the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.store.delete_session(cookie.value())?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/")).into_response())
}
