//! Integration tests for role and relationship based access.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::TestApp;
use worktrack_entity::user::UserRole;

#[tokio::test]
async fn test_admin_manages_users() {
    let app = TestApp::new().await;
    let admin = app.seed_user("root", UserRole::Admin).await;

    let created = app
        .call(
            &admin,
            "POST",
            "/api/users",
            Some(json!({
                "username": "carol",
                "password": "longenough",
                "email": "carol@example.com",
                "role": "member",
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    assert_eq!(created.data()["username"], "carol");
    assert_eq!(created.data()["isActive"], true);
    assert!(created.data().get("passwordHash").is_none());
    let carol_id = created.id();

    // The new account can log in with the password the admin chose.
    app.login("carol", "longenough").await;

    let duplicate = app
        .call(
            &admin,
            "POST",
            "/api/users",
            Some(json!({ "username": "carol", "password": "longenough", "role": "member" })),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let weak = app
        .call(
            &admin,
            "POST",
            "/api/users",
            Some(json!({ "username": "dave", "password": "short", "role": "member" })),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.body["field"], "password");

    let promoted = app
        .call(
            &admin,
            "PUT",
            &format!("/api/users/{carol_id}"),
            Some(json!({ "role": "manager", "displayName": "Carol" })),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.data()["role"], "manager");
    assert_eq!(promoted.data()["displayName"], "Carol");

    let listed = app.call(&admin, "GET", "/api/users", None).await;
    assert_eq!(listed.data().as_array().map(Vec::len), Some(2));

    let kinds = app.inbox_kinds(&admin).await;
    assert!(kinds.contains(&"user_created".to_string()));
    assert!(kinds.contains(&"user_updated".to_string()));
}

#[tokio::test]
async fn test_deactivation_revokes_access() {
    let app = TestApp::new().await;
    let admin = app.seed_user("root", UserRole::Admin).await;
    let member = app.seed_user("erin", UserRole::Member).await;
    let token = app.token_for(&member);

    let deactivated = app
        .call(&admin, "DELETE", &format!("/api/users/{}", member.id), None)
        .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(deactivated.data()["isActive"], false);

    let response = app
        .request("GET", "/api/notifications", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let still_listed = app
        .call(&admin, "GET", &format!("/api/users/{}", member.id), None)
        .await;
    assert_eq!(still_listed.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_lock_themselves_out() {
    let app = TestApp::new().await;
    let admin = app.seed_user("root", UserRole::Admin).await;

    let delete_self = app
        .call(&admin, "DELETE", &format!("/api/users/{}", admin.id), None)
        .await;
    assert_eq!(delete_self.status, StatusCode::BAD_REQUEST);

    let demote_self = app
        .call(
            &admin,
            "PUT",
            &format!("/api/users/{}", admin.id),
            Some(json!({ "role": "member" })),
        )
        .await;
    assert_eq!(demote_self.status, StatusCode::BAD_REQUEST);
    assert_eq!(demote_self.body["field"], "role");
}

#[tokio::test]
async fn test_non_admins_cannot_manage_users() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let member = app.seed_user("dev", UserRole::Member).await;

    for user in [&manager, &member] {
        let list = app.call(user, "GET", "/api/users", None).await;
        assert_eq!(list.status, StatusCode::FORBIDDEN);
        assert_eq!(list.message(), "role not permitted");

        let create = app
            .call(
                user,
                "POST",
                "/api/users",
                Some(json!({ "username": "sneaky", "password": "longenough", "role": "admin" })),
            )
            .await;
        assert_eq!(create.status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_manager_who_is_a_member_cannot_manage_anothers_project() {
    let app = TestApp::new().await;
    let owner = app.seed_user("owner", UserRole::Manager).await;
    let peer = app.seed_user("peer", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let id = app.create_project(&owner, "Shared", &[peer.id, dev.id]).await;

    let read = app
        .call(&peer, "GET", &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(read.status, StatusCode::OK);

    let update = app
        .call(
            &peer,
            "PUT",
            &format!("/api/projects/{id}"),
            Some(json!({ "name": "Taken over" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(update.message(), "not project manager");

    let create_task = app
        .call(
            &peer,
            "POST",
            "/api/tasks",
            Some(json!({ "projectId": id, "title": "Side quest", "assignedTo": [dev.id] })),
        )
        .await;
    assert_eq!(create_task.status, StatusCode::FORBIDDEN);
    assert_eq!(create_task.message(), "not project manager");
}

#[tokio::test]
async fn test_reassignment_moves_visibility() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let alice = app.seed_user("alice", UserRole::Member).await;
    let bob = app.seed_user("bob", UserRole::Member).await;
    let id = app.create_project(&manager, "Relay", &[alice.id, bob.id]).await;
    let task_ids = app
        .create_tasks(
            &manager,
            json!({ "projectId": id, "title": "Baton", "assignedTo": [alice.id] }),
        )
        .await;
    let path = format!("/api/tasks/{}", task_ids[0]);

    let before = app.call(&bob, "GET", &path, None).await;
    assert_eq!(before.status, StatusCode::FORBIDDEN);

    let assigned = app
        .call(
            &manager,
            "PATCH",
            &format!("{path}/assign"),
            Some(json!({ "userId": bob.id })),
        )
        .await;
    assert_eq!(assigned.status, StatusCode::OK, "{:?}", assigned.body);
    assert_eq!(assigned.data()["assignedTo"], json!(bob.id));

    let after = app.call(&bob, "GET", &path, None).await;
    assert_eq!(after.status, StatusCode::OK);

    let alice_now = app.call(&alice, "GET", &path, None).await;
    assert_eq!(alice_now.status, StatusCode::FORBIDDEN);

    let by_member = app
        .call(
            &alice,
            "PATCH",
            &format!("{path}/assign"),
            Some(json!({ "userId": alice.id })),
        )
        .await;
    assert_eq!(by_member.status, StatusCode::FORBIDDEN);
    assert_eq!(by_member.message(), "role not permitted");
}

#[tokio::test]
async fn test_removed_member_loses_project_but_keeps_assigned_task() {
    let app = TestApp::new().await;
    let manager = app.seed_user("pm", UserRole::Manager).await;
    let dev = app.seed_user("dev", UserRole::Member).await;
    let id = app.create_project(&manager, "Exit", &[dev.id]).await;
    let task_ids = app
        .create_tasks(
            &manager,
            json!({ "projectId": id, "title": "Handover", "assignedTo": [dev.id] }),
        )
        .await;

    let removed = app
        .call(
            &manager,
            "DELETE",
            &format!("/api/projects/{id}/remove-member/{}", dev.id),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let project = app
        .call(&dev, "GET", &format!("/api/projects/{id}"), None)
        .await;
    assert_eq!(project.status, StatusCode::NOT_FOUND);

    let task = app
        .call(&dev, "GET", &format!("/api/tasks/{}", task_ids[0]), None)
        .await;
    assert_eq!(task.status, StatusCode::OK);
}
