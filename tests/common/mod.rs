//! Shared helpers for the integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use tglinks::config::Config;
use tglinks::database::{init_db, AppState};
use tglinks::route::create_app;

pub const ADMIN_TOKEN: &str = "secret_token";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    _db: NamedTempFile,
}

/// Creates an application backed by a temporary database file
pub fn setup_test_app() -> TestApp {
    setup_with_config(Config {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..Config::default()
    })
}

pub fn setup_with_config(config: Config) -> TestApp {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let db = init_db(temp_db.path().to_str().unwrap()).expect("Failed to initialize test database");
    let state = AppState::new(db, config);

    TestApp {
        app: create_app(state.clone()),
        state,
        _db: temp_db,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(request("GET", uri, cookie, Body::empty())).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut request = request("POST", uri, cookie, Body::from(form_body(fields)));
        request.headers_mut().insert(
            "content-type",
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        self.send(request).await
    }

    /// Creates an account directly in the store and returns a session cookie
    /// for it (skips password hashing)
    pub fn login_as(&self, username: &str) -> String {
        let user = self
            .state
            .store
            .create_user(username, "not-a-password-hash".to_string())
            .unwrap();
        let token = self.state.store.create_session(&user.id, 1).unwrap();
        format!("sessionid={token}")
    }

    /// Uploads a link through the HTTP form and returns its hash_id
    pub async fn upload(&self, cookie: &str, title: &str, url: &str, category: &str) -> String {
        let response = self
            .post_form(
                "/upload",
                &[
                    ("title", title),
                    ("url", url),
                    ("description", ""),
                    ("link_type", "group"),
                    ("category", category),
                ],
                Some(cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        location(&response)
            .strip_prefix("/link/")
            .expect("redirect to the new link")
            .to_string()
    }
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(body).unwrap()
}

/// Builds an `application/x-www-form-urlencoded` body
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get("location")
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the first Set-Cookie header, if any
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Helper function to parse response body as JSON
pub async fn response_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}
