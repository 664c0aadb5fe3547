//! Integration tests for authentication flow.

mod helpers;

use http::StatusCode;
use serde_json::json;

use worktrack_entity::user::UserRole;

#[tokio::test]
async fn test_login_success() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("testuser", "password123", UserRole::Member)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "username": "testuser",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert!(data["accessToken"].as_str().is_some());
    assert_eq!(data["tokenType"], "Bearer");
    assert_eq!(data["user"]["username"], "testuser");
    assert_eq!(data["user"]["role"], "member");
    assert!(data["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("testuser2", "password123", UserRole::Member)
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "username": "testuser2",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
    assert_eq!(response.message(), "Invalid username or password");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({
                "username": "nobody",
                "password": "password123",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Invalid username or password");
}

#[tokio::test]
async fn test_login_inactive_user_rejected() {
    let app = helpers::TestApp::new().await;
    let user = app
        .create_test_user("sleeper", "password123", UserRole::Manager)
        .await;
    app.deactivate(&user).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "sleeper", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_missing_fields_is_validation_error() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    assert_eq!(response.body["field"], "username");
}

#[tokio::test]
async fn test_me_with_login_token() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("meuser", "password123", UserRole::Manager)
        .await;
    let token = app.login("meuser", "password123").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["username"], "meuser");
    assert_eq!(response.data()["role"], "manager");
}

#[tokio::test]
async fn test_unauthenticated_request() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/projects", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivated_user_token_stops_working() {
    let app = helpers::TestApp::new().await;
    let user = app.seed_user("leaver", UserRole::Member).await;
    let token = app.token_for(&user);

    let before = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(before.status, StatusCode::OK);

    app.deactivate(&user).await;

    let after = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_activity_logs_record_login_attempts() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("auditme", "password123", UserRole::Member)
        .await;

    let failed = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "auditme", "password": "nope-nope" })),
            None,
        )
        .await;
    assert_eq!(failed.status, StatusCode::UNAUTHORIZED);

    let token = app.login("auditme", "password123").await;

    let response = app
        .request("GET", "/api/activity-logs", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let actions: Vec<&str> = response.data()["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["LOGIN_SUCCESS", "LOGIN_FAILED"]);
}

#[tokio::test]
async fn test_activity_logs_are_private_to_non_admins() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("alice", "password123", UserRole::Member)
        .await;
    app.create_test_user("bob", "password123", UserRole::Member)
        .await;
    app.login("alice", "password123").await;
    let bob_token = app.login("bob", "password123").await;

    let response = app
        .request("GET", "/api/activity-logs", None, Some(&bob_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["totalItems"], 1);
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["store"], "connected");
}
