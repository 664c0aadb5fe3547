//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use worktrack_api::{AppState, build_app};
use worktrack_auth::{JwtEncoder, PasswordHasher};
use worktrack_core::config::AppConfig;
use worktrack_database::{Change, Store, StoreManager, UnitOfWork};
use worktrack_entity::user::{User, UserRole};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store for direct seeding and inspection
    pub store: Arc<StoreManager>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
        config.validate().expect("test config should be valid");

        let store = Arc::new(StoreManager::memory());
        let state = AppState::new(config.clone(), Arc::clone(&store));
        let router = build_app(state);
        let encoder = JwtEncoder::new(&config.auth);

        Self {
            router,
            store,
            config,
            encoder,
        }
    }

    /// Create a user with a real password hash so it can log in
    pub async fn create_test_user(&self, username: &str, password: &str, role: UserRole) -> User {
        let hash = PasswordHasher::new()
            .hash_password(password)
            .expect("Failed to hash password");
        self.insert_user(User::new(username, hash, role)).await
    }

    /// Create a user that is only ever used through minted tokens
    pub async fn seed_user(&self, username: &str, role: UserRole) -> User {
        self.insert_user(User::new(username, "!", role)).await
    }

    async fn insert_user(&self, user: User) -> User {
        let mut unit = UnitOfWork::new();
        unit.change(Change::InsertUser(user.clone()));
        self.store.commit(unit).await.expect("Failed to insert user");
        user
    }

    /// Flip a user's active flag directly in the store
    pub async fn deactivate(&self, user: &User) {
        let mut updated = user.clone();
        updated.is_active = false;
        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateUser(updated));
        self.store
            .commit(unit)
            .await
            .expect("Failed to deactivate user");
    }

    /// Mint an access token without going through login
    pub fn token_for(&self, user: &User) -> String {
        self.encoder
            .issue(user)
            .expect("Failed to issue token")
            .access_token
    }

    /// Login and return the access token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.data()["accessToken"]
            .as_str()
            .expect("No accessToken in login response")
            .to_string()
    }

    /// Create a project as `manager` and return its ID
    pub async fn create_project(&self, manager: &User, name: &str, members: &[Uuid]) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/projects",
                Some(json!({ "name": name, "members": members })),
                Some(&self.token_for(manager)),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Project creation failed: {:?}",
            response.body
        );
        response.id()
    }

    /// Create tasks as `manager` and return their IDs in assignee order
    pub async fn create_tasks(&self, manager: &User, body: Value) -> Vec<Uuid> {
        let response = self
            .request("POST", "/api/tasks", Some(body), Some(&self.token_for(manager)))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Task creation failed: {:?}",
            response.body
        );
        response
            .data()
            .as_array()
            .expect("task list")
            .iter()
            .map(|t| parse_id(&t["id"]))
            .collect()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Shorthand for an authenticated request as `user`
    pub async fn call(
        &self,
        user: &User,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let token = self.token_for(user);
        self.request(method, path, body, Some(&token)).await
    }

    /// Notification kinds in a user's inbox, newest first
    pub async fn inbox_kinds(&self, user: &User) -> Vec<String> {
        let response = self
            .call(user, "GET", "/api/notifications?limit=100", None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.data()["items"]
            .as_array()
            .expect("inbox items")
            .iter()
            .map(|n| n["kind"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `data.id` as a UUID
    pub fn id(&self) -> Uuid {
        parse_id(&self.data()["id"])
    }

    /// The `error` code of a failure body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The `message` of a failure body
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

fn parse_id(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("id should be a UUID string")
}
