//! Route definitions
//!
//! This module maps every path to its handler and wires the middleware:
//! the session layer wraps everything, `require_login` guards the member
//! routes and `auth_middleware` guards `/admin`.

use axum::middleware;
use axum::routing::{any, get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{accounts, admin, engagement, links};
use crate::middleware::{auth_middleware, require_login, session_middleware};

/// Creates the application router
///
/// # Route Definitions
///
/// Public:
/// - `GET /` - Home feed (`search`, `category`, `type`, `sort`, `page`)
/// - `GET /link/{hash_id}` - Link detail, counts a view
/// - `GET /category/{category_id}` - Category feed
/// - `GET|POST /register`, `GET|POST /login`, `POST /logout`
///
/// Login required:
/// - `GET|POST /upload` - Create a link
/// - `GET|POST /link/{hash_id}/edit` - Edit an owned link
/// - `GET|POST /link/{hash_id}/delete` - Soft-delete an owned link
/// - `POST /link/{hash_id}/like` - Toggle like (other methods get 400)
/// - `POST /link/{hash_id}/comment` - Add a comment
/// - `POST /comment/{id}/delete` - Soft-delete an own comment
/// - `GET /my-links` - Own links
///
/// Admin (`Authorization` header):
/// - `GET|POST /admin/categories`
/// - `POST /admin/links/{hash_id}/verify`
///
/// # Example Usage
///
/// ```no_run
/// # use tglinks::config::Config;
/// # use tglinks::database::{init_db, AppState};
/// # use tglinks::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(db, Config::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let member_routes = Router::new()
        .route("/upload", get(links::upload_form).post(links::upload_link))
        .route(
            "/link/{hash_id}/edit",
            get(links::edit_form).post(links::edit_link),
        )
        .route(
            "/link/{hash_id}/delete",
            get(links::delete_confirm).post(links::delete_link),
        )
        .route("/link/{hash_id}/like", any(engagement::toggle_like))
        .route("/link/{hash_id}/comment", post(engagement::add_comment))
        .route("/comment/{id}/delete", post(engagement::delete_comment))
        .route("/my-links", get(links::my_links))
        .route_layer(middleware::from_fn(require_login));

    let admin_routes = Router::new()
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/links/{hash_id}/verify", post(admin::verify_link))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(links::home))
        .route("/link/{hash_id}", get(links::link_detail))
        .route("/category/{category_id}", get(links::category_links))
        .route(
            "/register",
            get(accounts::register_form).post(accounts::register),
        )
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", post(accounts::logout))
        .merge(member_routes)
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}
