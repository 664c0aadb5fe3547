//! Integration tests for the notification inbox.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;
use worktrack_database::Store;
use worktrack_entity::user::{User, UserRole};

/// A manager and a member sharing a project; the member has received
/// `updates + 1` notifications (project creation plus each update).
async fn inbox_with(updates: usize) -> (TestApp, User, User) {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let member = app.seed_user("dev", UserRole::Member).await;
    let id = app.create_project(&manager, "Apollo", &[member.id]).await;
    for i in 0..updates {
        let response = app
            .call(
                &manager,
                "PUT",
                &format!("/api/projects/{id}"),
                Some(json!({ "description": format!("rev {i}") })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    (app, manager, member)
}

#[tokio::test]
async fn test_inbox_lists_newest_first_with_unread_count() {
    let (app, _manager, member) = inbox_with(2).await;

    let response = app.call(&member, "GET", "/api/notifications", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["kind"], "project_updated");
    assert_eq!(items[2]["kind"], "project_created");
    assert_eq!(items[0]["isRead"], false);
    assert_eq!(items[0]["recipientId"], json!(member.id));
    assert!(items[0]["projectId"].is_string());
    assert_eq!(response.data()["unreadCount"], 3);
}

#[tokio::test]
async fn test_limit_is_applied() {
    let (app, _manager, member) = inbox_with(4).await;

    let response = app
        .call(&member, "GET", "/api/notifications?limit=2", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(response.data()["unreadCount"], 5);
}

#[tokio::test]
async fn test_mark_read_and_unread_filter() {
    let (app, _manager, member) = inbox_with(1).await;

    let list = app.call(&member, "GET", "/api/notifications", None).await;
    let newest = list.data()["items"][0]["id"]
        .as_str()
        .expect("notification id")
        .to_string();

    let marked = app
        .call(&member, "PATCH", &format!("/api/notifications/{newest}/read"), None)
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.data()["isRead"], true);
    assert!(marked.data()["readAt"].is_string());

    let count = app
        .call(&member, "GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(count.status, StatusCode::OK);
    assert_eq!(count.data()["count"], 1);

    let unread = app
        .call(&member, "GET", "/api/notifications?unreadOnly=true", None)
        .await;
    let items = unread.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "project_created");

    let again = app
        .call(&member, "PATCH", &format!("/api/notifications/{newest}/read"), None)
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.data()["isRead"], true);
}

#[tokio::test]
async fn test_mark_all_read() {
    let (app, _manager, member) = inbox_with(3).await;

    let response = app
        .call(&member, "PATCH", "/api/notifications/mark-all-read", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["marked"], 4);

    let second = app
        .call(&member, "PATCH", "/api/notifications/mark-all-read", None)
        .await;
    assert_eq!(second.data()["marked"], 0);

    let count = app
        .call(&member, "GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(count.data()["count"], 0);
}

#[tokio::test]
async fn test_cannot_touch_someone_elses_notification() {
    let (app, _manager, member) = inbox_with(0).await;
    let stranger = app.seed_user("stranger", UserRole::Member).await;

    let list = app.call(&member, "GET", "/api/notifications", None).await;
    let id = list.data()["items"][0]["id"]
        .as_str()
        .expect("notification id")
        .to_string();

    let response = app
        .call(&stranger, "PATCH", &format!("/api/notifications/{id}/read"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), "Notification not found");

    let count = app
        .call(&member, "GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(count.data()["count"], 1);

    let missing = app
        .call(
            &member,
            "PATCH",
            &format!("/api/notifications/{}/read", uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_notification_id_is_validation_error() {
    let (app, _manager, member) = inbox_with(0).await;

    let response = app
        .call(&member, "PATCH", "/api/notifications/not-a-uuid/read", None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_admins_receive_every_broadcast() {
    let app = TestApp::new().await;
    let admin = app.seed_user("root", UserRole::Admin).await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let member = app.seed_user("dev", UserRole::Member).await;

    let id = app.create_project(&manager, "Apollo", &[member.id]).await;
    app.create_tasks(
        &manager,
        json!({ "projectId": id, "title": "Watched", "assignedTo": [member.id] }),
    )
    .await;

    let kinds = app.inbox_kinds(&admin).await;
    assert_eq!(kinds.iter().filter(|k| *k == "project_created").count(), 1);
    assert_eq!(kinds.iter().filter(|k| *k == "task_created").count(), 1);
    assert_eq!(kinds.iter().filter(|k| *k == "task_assigned").count(), 1);
}

#[tokio::test]
async fn test_inactive_admin_is_left_out_of_broadcasts() {
    let app = TestApp::new().await;
    let retired = app.seed_user("retired", UserRole::Admin).await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    app.deactivate(&retired).await;

    app.create_project(&manager, "Quiet", &[]).await;

    let notifications = app
        .store
        .list_notifications(retired.id, false, 100)
        .await
        .expect("inbox");
    assert!(notifications.is_empty());
}
