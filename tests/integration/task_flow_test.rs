//! Integration tests for tasks, their progress logs and due-soon alerts.

mod helpers;

use chrono::{Duration, Utc};
use http::StatusCode;
use serde_json::json;

use helpers::TestApp;
use worktrack_entity::user::{User, UserRole};

struct Team {
    app: TestApp,
    manager: User,
    alice: User,
    bob: User,
    project_id: uuid::Uuid,
}

async fn team() -> Team {
    let app = TestApp::new().await;
    let manager = app.seed_user("manager", UserRole::Manager).await;
    let alice = app.seed_user("alice", UserRole::Member).await;
    let bob = app.seed_user("bob", UserRole::Member).await;
    let project_id = app
        .create_project(&manager, "Apollo", &[alice.id, bob.id])
        .await;
    Team {
        app,
        manager,
        alice,
        bob,
        project_id,
    }
}

#[tokio::test]
async fn test_create_with_several_assignees_makes_one_task_each() {
    let t = team().await;

    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({
                "projectId": t.project_id,
                "title": "Write report",
                "assignedTo": [t.alice.id, t.bob.id],
                "priority": "high",
            }),
        )
        .await;
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let first = t
        .app
        .call(&t.alice, "GET", &format!("/api/tasks/{}", ids[0]), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.data()["assignedTo"], json!(t.alice.id));
    assert_eq!(first.data()["status"], "pending");
    assert_eq!(first.data()["priority"], "high");

    // Each assignee sees only their own copy.
    let hidden = t
        .app
        .call(&t.alice, "GET", &format!("/api/tasks/{}", ids[1]), None)
        .await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);
    assert_eq!(hidden.message(), "not assignee");

    assert!(t.app.inbox_kinds(&t.alice).await.contains(&"task_assigned".to_string()));
    assert!(t.app.inbox_kinds(&t.bob).await.contains(&"task_assigned".to_string()));

    let manager_kinds = t.app.inbox_kinds(&t.manager).await;
    assert_eq!(manager_kinds.iter().filter(|k| *k == "task_created").count(), 1);
    assert_eq!(manager_kinds.iter().filter(|k| *k == "task_assigned").count(), 2);
}

#[tokio::test]
async fn test_single_assignee_accepted_as_scalar() {
    let t = team().await;

    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({
                "projectId": t.project_id,
                "title": "Solo",
                "assignedTo": t.bob.id,
            }),
        )
        .await;

    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn test_assignee_outside_project_is_rejected() {
    let t = team().await;
    let outsider = t.app.seed_user("outsider", UserRole::Member).await;

    let response = t
        .app
        .call(
            &t.manager,
            "POST",
            "/api/tasks",
            Some(json!({
                "projectId": t.project_id,
                "title": "Nope",
                "assignedTo": [outsider.id],
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "assignedTo");
    assert!(t.app.inbox_kinds(&outsider).await.is_empty());
}

#[tokio::test]
async fn test_unrelated_manager_sees_not_found() {
    let t = team().await;
    let stranger = t.app.seed_user("stranger", UserRole::Manager).await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Secret", "assignedTo": [t.alice.id] }),
        )
        .await;
    let path = format!("/api/tasks/{}", ids[0]);

    let read = t.app.call(&stranger, "GET", &path, None).await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);
    assert_eq!(read.message(), "Task not found");

    let write = t
        .app
        .call(
            &stranger,
            "PATCH",
            &format!("{path}/status"),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(write.status, StatusCode::NOT_FOUND);

    let listed = t.app.call(&stranger, "GET", "/api/tasks", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_non_assignee_member_cannot_change_status() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Alice's", "assignedTo": [t.alice.id] }),
        )
        .await;

    let response = t
        .app
        .call(
            &t.bob,
            "PATCH",
            &format!("/api/tasks/{}/status", ids[0]),
            Some(json!({ "status": "in-progress" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");
    assert_eq!(response.message(), "not assignee");
}

#[tokio::test]
async fn test_assignee_status_change_notifies_manager() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Move me", "assignedTo": [t.alice.id] }),
        )
        .await;

    let response = t
        .app
        .call(
            &t.alice,
            "PATCH",
            &format!("/api/tasks/{}/status", ids[0]),
            Some(json!({ "status": "in-progress" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "in-progress");
    assert_eq!(response.data()["version"], 2);

    let manager_kinds = t.app.inbox_kinds(&t.manager).await;
    assert_eq!(manager_kinds.first().map(String::as_str), Some("task_status_changed"));
    assert!(!t.app.inbox_kinds(&t.alice).await.contains(&"task_status_changed".to_string()));
}

#[tokio::test]
async fn test_member_cannot_create_tasks() {
    let t = team().await;

    let response = t
        .app
        .call(
            &t.alice,
            "POST",
            "/api/tasks",
            Some(json!({ "projectId": t.project_id, "title": "Self-assigned" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "role not permitted");
}

#[tokio::test]
async fn test_admin_is_read_only_on_tasks() {
    let t = team().await;
    let admin = t.app.seed_user("root", UserRole::Admin).await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Audited", "assignedTo": [t.alice.id] }),
        )
        .await;

    let read = t
        .app
        .call(&admin, "GET", &format!("/api/tasks/{}", ids[0]), None)
        .await;
    assert_eq!(read.status, StatusCode::OK);

    let delete = t
        .app
        .call(&admin, "DELETE", &format!("/api/tasks/{}", ids[0]), None)
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(delete.message(), "admin cannot modify projects or tasks");
}

#[tokio::test]
async fn test_update_can_clear_deadline() {
    let t = team().await;
    let deadline = (Utc::now() + Duration::days(7)).to_rfc3339();
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Dated", "deadline": deadline }),
        )
        .await;
    let path = format!("/api/tasks/{}", ids[0]);

    let renamed = t
        .app
        .call(&t.manager, "PUT", &path, Some(json!({ "title": "Renamed" })))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert!(renamed.data()["deadline"].is_string());

    let cleared = t
        .app
        .call(&t.manager, "PUT", &path, Some(json!({ "deadline": null })))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["deadline"].is_null());
    assert_eq!(cleared.data()["title"], "Renamed");
}

#[tokio::test]
async fn test_progress_log_chain() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Logged", "assignedTo": [t.alice.id] }),
        )
        .await;
    let logs = format!("/api/tasks/{}/logs", ids[0]);

    for _ in 0..2 {
        let appended = t
            .app
            .call(
                &t.alice,
                "POST",
                &logs,
                Some(json!({ "content": "still going", "progressPercent": 40 })),
            )
            .await;
        assert_eq!(appended.status, StatusCode::CREATED, "{:?}", appended.body);
    }
    let finished = t
        .app
        .call(
            &t.alice,
            "POST",
            &logs,
            Some(json!({ "content": "done", "progressPercent": 100, "status": "completed" })),
        )
        .await;
    assert_eq!(finished.status, StatusCode::CREATED);

    let listed = t.app.call(&t.manager, "GET", &logs, None).await;
    assert_eq!(listed.status, StatusCode::OK);
    let contents: Vec<&str> = listed
        .data()
        .as_array()
        .expect("log entries")
        .iter()
        .filter_map(|e| e["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["still going", "still going", "done"]);

    let task = t
        .app
        .call(&t.manager, "GET", &format!("/api/tasks/{}", ids[0]), None)
        .await;
    assert_eq!(task.data()["status"], "completed");

    let manager_kinds = t.app.inbox_kinds(&t.manager).await;
    assert_eq!(manager_kinds.iter().filter(|k| *k == "task_log_added").count(), 3);
}

#[tokio::test]
async fn test_only_assignee_appends_logs() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Mine", "assignedTo": [t.alice.id] }),
        )
        .await;
    let logs = format!("/api/tasks/{}/logs", ids[0]);

    let by_bob = t
        .app
        .call(&t.bob, "POST", &logs, Some(json!({ "content": "hijack" })))
        .await;
    assert_eq!(by_bob.status, StatusCode::FORBIDDEN);
    assert_eq!(by_bob.message(), "not assignee");

    let out_of_range = t
        .app
        .call(
            &t.alice,
            "POST",
            &logs,
            Some(json!({ "content": "overachiever", "progressPercent": 150 })),
        )
        .await;
    assert_eq!(out_of_range.status, StatusCode::BAD_REQUEST);
    assert_eq!(out_of_range.body["field"], "progressPercent");

    let listed = t.app.call(&t.alice, "GET", &logs, None).await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_due_soon_alert_is_sent_once() {
    let t = team().await;
    let soon = (Utc::now() + Duration::hours(2)).to_rfc3339();
    let later = (Utc::now() + Duration::days(10)).to_rfc3339();
    t.app
        .create_tasks(
            &t.manager,
            json!({
                "projectId": t.project_id,
                "title": "Urgent",
                "assignedTo": [t.alice.id],
                "deadline": soon,
            }),
        )
        .await;
    t.app
        .create_tasks(
            &t.manager,
            json!({
                "projectId": t.project_id,
                "title": "Relaxed",
                "assignedTo": [t.alice.id],
                "deadline": later,
            }),
        )
        .await;

    for _ in 0..3 {
        let listed = t.app.call(&t.alice, "GET", "/api/tasks", None).await;
        assert_eq!(listed.status, StatusCode::OK);
        assert_eq!(listed.data().as_array().map(Vec::len), Some(2));
    }

    let alice_kinds = t.app.inbox_kinds(&t.alice).await;
    assert_eq!(alice_kinds.iter().filter(|k| *k == "due_soon").count(), 1);
    assert!(!t.app.inbox_kinds(&t.manager).await.contains(&"due_soon".to_string()));
}

#[tokio::test]
async fn test_task_listing_filters_by_status() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Filter", "assignedTo": [t.alice.id, t.bob.id] }),
        )
        .await;
    t.app
        .call(
            &t.manager,
            "PATCH",
            &format!("/api/tasks/{}/status", ids[0]),
            Some(json!({ "status": "blocked" })),
        )
        .await;

    let blocked = t
        .app
        .call(&t.manager, "GET", "/api/tasks?status=blocked", None)
        .await;
    assert_eq!(blocked.status, StatusCode::OK);
    let listed = blocked.data().as_array().expect("tasks");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], json!(ids[0]));

    let bad = t
        .app
        .call(&t.manager, "GET", "/api/tasks?status=sleeping", None)
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_enum_values_name_the_field() {
    let t = team().await;
    let ids = t
        .app
        .create_tasks(
            &t.manager,
            json!({ "projectId": t.project_id, "title": "Enums", "assignedTo": [t.alice.id] }),
        )
        .await;

    let status = t
        .app
        .call(
            &t.alice,
            "PATCH",
            &format!("/api/tasks/{}/status", ids[0]),
            Some(json!({ "status": "done" })),
        )
        .await;
    assert_eq!(status.status, StatusCode::BAD_REQUEST);
    assert_eq!(status.error_code(), "VALIDATION_ERROR");
    assert_eq!(status.body["field"], "status");

    let priority = t
        .app
        .call(
            &t.manager,
            "POST",
            "/api/tasks",
            Some(json!({
                "projectId": t.project_id,
                "title": "Rushed",
                "assignedTo": [t.alice.id],
                "priority": "critical",
            })),
        )
        .await;
    assert_eq!(priority.status, StatusCode::BAD_REQUEST);
    assert_eq!(priority.body["field"], "priority");

    let update = t
        .app
        .call(
            &t.manager,
            "PUT",
            &format!("/api/tasks/{}", ids[0]),
            Some(json!({ "priority": "whenever" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);
    assert_eq!(update.body["field"], "priority");
}
