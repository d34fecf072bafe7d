mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use user_accounts::application::services::TokenService;
use user_accounts::domain::entities::Role;

#[tokio::test]
async fn test_register_normalizes_email_and_defaults_role() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/auth/register")
        .json(&json!({ "name": "Alice", "email": "Alice@X.com", "password": "secret12" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<Value>();
    assert_eq!(json["name"], "Alice");
    assert_eq!(json["email"], "alice@x.com");
    assert_eq!(json["role"], "standard");
    assert!(json["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_ignores_role_in_body() {
    let server = common::test_server(common::create_test_state());

    let response = server
        .post("/auth/register")
        .json(&json!({
            "name": "Mallory",
            "email": "mallory@x.com",
            "password": "secret12",
            "role": "admin"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["role"], "standard");
}

#[tokio::test]
async fn test_register_duplicate_email_differing_in_case() {
    let server = common::test_server(common::create_test_state());

    server
        .post("/auth/register")
        .json(&json!({ "name": "Alice", "email": "alice@x.com", "password": "secret12" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/auth/register")
        .json(&json!({ "name": "Alice Two", "email": " ALICE@x.com ", "password": "secret34" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "USER_ALREADY_EXISTS"
    );
}

#[tokio::test]
async fn test_register_validation_errors() {
    let server = common::test_server(common::create_test_state());

    let cases = [
        json!({ "name": "A", "email": "a@x.com", "password": "secret12" }),
        json!({ "name": "Alice", "email": "not-an-email", "password": "secret12" }),
        json!({ "name": "Alice", "email": "a@x.com", "password": "12345" }),
    ];

    for body in cases {
        let response = server.post("/auth/register").json(&body).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn test_login_returns_token_for_registered_account() {
    let state = common::create_test_state();
    let tokens = state.tokens.clone();
    let server = common::test_server(state);

    let registered = server
        .post("/auth/register")
        .json(&json!({ "name": "Alice", "email": "Alice@X.com", "password": "secret12" }))
        .await
        .json::<Value>();

    let response = server
        .post("/auth/login")
        .json(&json!({ "email": "alice@x.com", "password": "secret12" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
    assert_eq!(json["user"]["id"], registered["id"]);

    let claims = tokens.validate(json["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, registered["id"].as_str().unwrap());
    assert_eq!(claims.email, "alice@x.com");
    assert_eq!(claims.role, Role::Standard);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let state = common::create_test_state();
    common::seed_account(&state, "Alice", "alice@x.com", Role::Standard).await;
    let server = common::test_server(state);

    let wrong_password = server
        .post("/auth/login")
        .json(&json!({ "email": "alice@x.com", "password": "wrong-password" }))
        .await;
    let unknown_email = server
        .post("/auth/login")
        .json(&json!({ "email": "nobody@x.com", "password": "secret12" }))
        .await;

    wrong_password.assert_status_unauthorized();
    unknown_email.assert_status_unauthorized();

    let a = wrong_password.json::<Value>();
    let b = unknown_email.json::<Value>();
    assert_eq!(a["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let server = common::test_server(common::create_test_state());

    let response = server.post("/auth/refresh").await;

    response.assert_status_unauthorized();
    assert_eq!(response.header(header::WWW_AUTHENTICATE), "Bearer");
    assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_refresh_issues_new_token() {
    let state = common::create_test_state();
    let tokens = state.tokens.clone();
    let alice = common::seed_account(&state, "Alice", "alice@x.com", Role::Standard).await;
    let server = common::test_server(state);

    let token = common::login(&server, "alice@x.com", "secret12").await;

    let response = server
        .post("/auth/refresh")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    let claims = tokens.validate(json["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, alice.id);
    assert_eq!(json["user"]["email"], "alice@x.com");
}
