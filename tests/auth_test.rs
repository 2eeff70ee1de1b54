//! Registration, login, logout and the admin API guard

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};

use common::{
    location, response_json, session_cookie, setup_test_app, setup_with_config, TestApp,
    ADMIN_TOKEN,
};
use tglinks::config::Config;

async fn register(test: &TestApp, username: &str, password: &str) -> axum::response::Response {
    test.post_form(
        "/register",
        &[
            ("username", username),
            ("password1", password),
            ("password2", password),
        ],
        None,
    )
    .await
}

async fn admin_request(
    test: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    test.send(builder.body(body).unwrap()).await
}

#[tokio::test]
async fn test_register_logs_in_and_welcomes() {
    let test = setup_test_app();

    let response = register(&test, "dave", "correct-horse-42").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let cookie = session_cookie(&response).expect("session cookie");
    assert!(cookie.starts_with("sessionid="));

    let body = response_json(test.get("/", Some(&cookie)).await).await;
    assert_eq!(
        body["messages"],
        json!([{ "level": "success", "text": "Welcome dave! Your account has been created." }])
    );

    // Messages are shown once
    let body = response_json(test.get("/", Some(&cookie)).await).await;
    assert!(body["messages"].as_array().unwrap().is_empty());

    let response = test.get("/upload", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_taken_username() {
    let test = setup_test_app();
    test.login_as("taken");

    let response = register(&test, "taken", "correct-horse-42").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session_cookie(&response).is_none());

    let body = response_json(response).await;
    assert_eq!(
        body["fields"]["username"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn test_register_rejects_weak_passwords() {
    let test = setup_test_app();

    let response = register(&test, "erin", "12345678").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["fields"]["password2"][0], "This password is entirely numeric.");

    let response = test
        .post_form(
            "/register",
            &[
                ("username", "erin"),
                ("password1", "correct-horse-42"),
                ("password2", "correct-horse-43"),
            ],
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["fields"]["password2"][0], "The two password fields didn't match.");

    assert!(test
        .state
        .store
        .find_user_by_username("erin")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_register_while_logged_in_goes_home() {
    let test = setup_test_app();
    let alice = test.login_as("alice");

    let response = test
        .post_form(
            "/register",
            &[
                ("username", "second"),
                ("password1", "correct-horse-42"),
                ("password2", "correct-horse-42"),
            ],
            Some(&alice),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(test
        .state
        .store
        .find_user_by_username("second")
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_login_checks_credentials_and_follows_next() {
    let test = setup_test_app();
    register(&test, "carol", "correct-horse-42").await;

    let response = test
        .post_form(
            "/login",
            &[("username", "carol"), ("password", "wrong-password")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session_cookie(&response).is_none());
    let body = response_json(response).await;
    assert!(body["fields"]["__all__"][0]
        .as_str()
        .unwrap()
        .starts_with("Please enter a correct username and password."));

    let response = test
        .post_form(
            "/login",
            &[
                ("username", "carol"),
                ("password", "correct-horse-42"),
                ("next", "/my-links"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/my-links");
    let cookie = session_cookie(&response).expect("session cookie");

    let response = test.get("/my-links", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .post_form(
            "/login",
            &[
                ("username", "carol"),
                ("password", "correct-horse-42"),
                ("next", "//evil.example"),
            ],
            None,
        )
        .await;
    assert_eq!(location(&response), "/");

    let response = test
        .post_form(
            "/login",
            &[
                ("username", "carol"),
                ("password", "correct-horse-42"),
                ("next", "/\\evil.example"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let test = setup_test_app();
    let alice = test.login_as("alice");

    let response = test.post_form("/logout", &[], Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = test.get("/my-links", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fmy-links");
}

#[tokio::test]
async fn test_unknown_session_is_anonymous() {
    let test = setup_test_app();

    let response = test.get("/", Some("sessionid=forged")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test.get("/upload", Some("sessionid=forged")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_requires_authorization() {
    let test = setup_test_app();

    let response = admin_request(&test, "GET", "/admin/categories", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Unauthorized");

    let response =
        admin_request(&test, "GET", "/admin/categories", Some("wrong_token"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response =
        admin_request(&test, "GET", "/admin/categories", Some(ADMIN_TOKEN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!([]));
}

#[tokio::test]
async fn test_admin_disabled_without_secret() {
    let test = setup_with_config(Config::default());

    let response =
        admin_request(&test, "GET", "/admin/categories", Some(ADMIN_TOKEN), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_creates_and_lists_categories() {
    let test = setup_test_app();
    let alice = test.login_as("alice");
    test.upload(&alice, "Python Devs", "https://t.me/pydevs", "programming")
        .await;

    let create = |name: &str| json!({ "name": name, "description": "Code talk" });

    let response = admin_request(
        &test,
        "POST",
        "/admin/categories",
        Some(ADMIN_TOKEN),
        Some(create("programming")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["name"], "programming");
    assert_eq!(body["description"], "Code talk");

    let response = admin_request(
        &test,
        "POST",
        "/admin/categories",
        Some(ADMIN_TOKEN),
        Some(create("programming")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = admin_request(
        &test,
        "POST",
        "/admin/categories",
        Some(ADMIN_TOKEN),
        Some(create("  ")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response =
        admin_request(&test, "GET", "/admin/categories", Some(ADMIN_TOKEN), None).await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "programming");
    assert_eq!(body[0]["link_count"], 1);
}

#[tokio::test]
async fn test_admin_verifies_links() {
    let test = setup_test_app();
    let alice = test.login_as("alice");
    let hash_id = test
        .upload(&alice, "Python Devs", "https://t.me/pydevs", "programming")
        .await;

    let response = admin_request(
        &test,
        "POST",
        &format!("/admin/links/{hash_id}/verify"),
        Some(ADMIN_TOKEN),
        Some(json!({ "is_verified": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({ "hash_id": hash_id, "is_verified": true })
    );

    let body = response_json(test.get(&format!("/link/{hash_id}"), None).await).await;
    assert_eq!(body["link"]["is_verified"], true);

    let response = admin_request(
        &test,
        "POST",
        "/admin/links/missing/verify",
        Some(ADMIN_TOKEN),
        Some(json!({ "is_verified": true })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Members cannot reach the admin API with a session alone
    let response = test
        .post_form(&format!("/admin/links/{hash_id}/verify"), &[], Some(&alice))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
