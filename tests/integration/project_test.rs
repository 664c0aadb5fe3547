//! Integration tests for projects and membership.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;
use worktrack_entity::user::UserRole;

#[tokio::test]
async fn test_manager_creates_project_with_defaults() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let member = app.seed_user("dev", UserRole::Member).await;

    let response = app
        .call(
            &manager,
            "POST",
            "/api/projects",
            Some(json!({ "name": "  Apollo  ", "members": [member.id, member.id] })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["name"], "Apollo");
    assert_eq!(data["managerId"], json!(manager.id));
    assert_eq!(data["members"], json!([member.id]));
    assert_eq!(data["status"], "active");
    assert_eq!(data["version"], 1);

    assert_eq!(app.inbox_kinds(&member).await, vec!["project_created"]);
    assert!(app.inbox_kinds(&manager).await.is_empty());
}

#[tokio::test]
async fn test_project_creation_rules() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let member = app.seed_user("dev", UserRole::Member).await;
    let admin = app.seed_user("root", UserRole::Admin).await;

    let by_member = app
        .call(&member, "POST", "/api/projects", Some(json!({ "name": "Mine" })))
        .await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);

    let by_admin = app
        .call(&admin, "POST", "/api/projects", Some(json!({ "name": "Root's" })))
        .await;
    assert_eq!(by_admin.status, StatusCode::FORBIDDEN);

    let manager_as_member = app
        .call(
            &manager,
            "POST",
            "/api/projects",
            Some(json!({ "name": "Loop", "members": [manager.id] })),
        )
        .await;
    assert_eq!(manager_as_member.status, StatusCode::BAD_REQUEST);
    assert_eq!(manager_as_member.body["field"], "members");

    let admin_as_member = app
        .call(
            &manager,
            "POST",
            "/api/projects",
            Some(json!({ "name": "Loop", "members": [admin.id] })),
        )
        .await;
    assert_eq!(admin_as_member.status, StatusCode::BAD_REQUEST);
    assert_eq!(admin_as_member.body["field"], "members");

    let blank = app
        .call(&manager, "POST", "/api/projects", Some(json!({ "name": "" })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["field"], "name");
}

#[tokio::test]
async fn test_listing_follows_relationships() {
    let app = TestApp::new().await;
    let pm1 = app.seed_user("pm1", UserRole::Manager).await;
    let pm2 = app.seed_user("pm2", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let admin = app.seed_user("root", UserRole::Admin).await;

    let first = app.create_project(&pm1, "First", &[dev.id]).await;
    let second = app.create_project(&pm2, "Second", &[]).await;

    let count = |response: &helpers::TestResponse| response.data().as_array().map(Vec::len);

    let for_pm1 = app.call(&pm1, "GET", "/api/projects", None).await;
    assert_eq!(count(&for_pm1), Some(1));
    assert_eq!(for_pm1.data()[0]["id"], json!(first));

    let for_dev = app.call(&dev, "GET", "/api/projects", None).await;
    assert_eq!(count(&for_dev), Some(1));

    let for_admin = app.call(&admin, "GET", "/api/projects", None).await;
    assert_eq!(count(&for_admin), Some(2));

    let hidden = app
        .call(&pm1, "GET", &format!("/api/projects/{second}"), None)
        .await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
    assert_eq!(hidden.message(), "Project not found");
}

#[tokio::test]
async fn test_update_bumps_version_and_notifies_members() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let id = app.create_project(&manager, "Apollo", &[dev.id]).await;

    let response = app
        .call(
            &manager,
            "PUT",
            &format!("/api/projects/{id}"),
            Some(json!({ "status": "on-hold" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "on-hold");
    assert_eq!(response.data()["version"], 2);
    assert_eq!(
        app.inbox_kinds(&dev).await.first().map(String::as_str),
        Some("project_updated")
    );

    let by_member = app
        .call(
            &dev,
            "PUT",
            &format!("/api/projects/{id}"),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);
    assert_eq!(by_member.message(), "role not permitted");
}

#[tokio::test]
async fn test_membership_changes() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let newcomer = app.seed_user("newcomer", UserRole::Member).await;
    let id = app.create_project(&manager, "Apollo", &[dev.id]).await;
    let add = format!("/api/projects/{id}/add-member");

    let added = app
        .call(&manager, "POST", &add, Some(json!({ "userId": newcomer.id })))
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.data()["members"], json!([dev.id, newcomer.id]));
    assert!(app.inbox_kinds(&newcomer).await.contains(&"project_member_added".to_string()));

    let again = app
        .call(&manager, "POST", &add, Some(json!({ "userId": newcomer.id })))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let manager_itself = app
        .call(&manager, "POST", &add, Some(json!({ "userId": manager.id })))
        .await;
    assert_eq!(manager_itself.status, StatusCode::BAD_REQUEST);
    assert_eq!(manager_itself.body["field"], "userId");

    let unknown = app
        .call(&manager, "POST", &add, Some(json!({ "userId": uuid::Uuid::new_v4() })))
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.body["field"], "userId");

    let by_member = app
        .call(&dev, "POST", &add, Some(json!({ "userId": newcomer.id })))
        .await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);

    let removed = app
        .call(
            &manager,
            "DELETE",
            &format!("/api/projects/{id}/remove-member/{}", newcomer.id),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.data()["members"], json!([dev.id]));
    assert_eq!(
        app.inbox_kinds(&newcomer).await.first().map(String::as_str),
        Some("project_member_removed")
    );

    let gone = app
        .call(
            &manager,
            "DELETE",
            &format!("/api/projects/{id}/remove-member/{}", newcomer.id),
            None,
        )
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let after = app
        .call(&newcomer, "GET", &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_cascades_tasks_but_keeps_history() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let admin = app.seed_user("root", UserRole::Admin).await;
    let id = app.create_project(&manager, "Doomed", &[dev.id]).await;
    let task_ids = app
        .create_tasks(
            &manager,
            json!({ "projectId": id, "title": "Orphan", "assignedTo": [dev.id] }),
        )
        .await;
    app.call(
        &dev,
        "POST",
        &format!("/api/tasks/{}/logs", task_ids[0]),
        Some(json!({ "content": "halfway", "progressPercent": 50 })),
    )
    .await;

    let deleted = app
        .call(&manager, "DELETE", &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let project = app
        .call(&admin, "GET", &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(project.status, StatusCode::NOT_FOUND);
    let task = app
        .call(&admin, "GET", &format!("/api/tasks/{}", task_ids[0]), None)
        .await;
    assert_eq!(task.status, StatusCode::NOT_FOUND);

    let audit = app
        .call(&admin, "GET", &format!("/api/admin/audit?projectId={id}&pageSize=100"), None)
        .await;
    assert_eq!(audit.status, StatusCode::OK, "{:?}", audit.body);
    let actions: Vec<&str> = audit.data()["items"]
        .as_array()
        .expect("audit items")
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert_eq!(actions.first(), Some(&"PROJECT_DELETED"));
    assert!(actions.contains(&"PROJECT_CREATED"));
    assert!(actions.contains(&"TASK_CREATED"));
    assert!(actions.contains(&"TASK_LOG_ADDED"));

    let dev_kinds = app.inbox_kinds(&dev).await;
    assert_eq!(dev_kinds.first().map(String::as_str), Some("project_deleted"));
    assert!(dev_kinds.contains(&"task_assigned".to_string()));
}

#[tokio::test]
async fn test_audit_search_is_admin_only() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;

    let response = app.call(&manager, "GET", "/api/admin/audit", None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "role not permitted");
}
