//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use worktrack_entity::audit::AuditAction;
use worktrack_entity::project::ProjectStatus;
use worktrack_entity::task::{TaskPriority, TaskStatus};
use worktrack_entity::user::UserRole;
use worktrack_service::audit::service::AuditSearch;
use worktrack_service::project::{CreateProjectRequest as CreateProject, UpdateProjectRequest as UpdateProject};
use worktrack_service::task::{
    AppendLogRequest as AppendLog, CreateTaskRequest as CreateTask, TaskFilter,
    UpdateTaskRequest as UpdateTask,
};
use worktrack_service::user::{CreateUserRequest as CreateUser, UpdateUserRequest as UpdateUser};

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Username.
    #[validate(length(min = 3, max = 100, message = "Username must be 3 to 100 characters"))]
    pub username: String,
    /// Initial password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Role.
    pub role: UserRole,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            email: req.email,
            display_name: req.display_name,
            role: req.role,
        }
    }
}

/// Update user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Display name.
    pub display_name: Option<String>,
    /// Email.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    /// Role.
    pub role: Option<UserRole>,
    /// Active flag.
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            display_name: req.display_name,
            email: req.email,
            role: req.role,
            is_active: req.is_active,
        }
    }
}

/// Create project request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    #[validate(length(min = 1, max = 200, message = "Project name is required"))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Owning manager (defaults to the caller).
    pub manager_id: Option<Uuid>,
    /// Initial members.
    #[serde(default)]
    pub members: Vec<Uuid>,
    /// Initial status.
    pub status: Option<ProjectStatus>,
}

impl From<CreateProjectRequest> for CreateProject {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            manager_id: req.manager_id,
            members: req.members,
            status: req.status,
        }
    }
}

/// Update project request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// Name.
    #[validate(length(min = 1, max = 200, message = "Project name cannot be empty"))]
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Status.
    pub status: Option<ProjectStatus>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            status: req.status,
        }
    }
}

/// Body of add-member and assign.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRefRequest {
    /// The user.
    pub user_id: Uuid,
}

/// One assignee or several.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignees {
    /// A single user ID.
    One(Uuid),
    /// A list of user IDs.
    Many(Vec<Uuid>),
}

impl Default for Assignees {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl Assignees {
    /// Flatten into a list.
    pub fn into_vec(self) -> Vec<Uuid> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
        }
    }
}

/// Create task request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Owning project.
    pub project_id: Uuid,
    /// Title.
    #[validate(length(min = 1, max = 300, message = "Task title is required"))]
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Assignees.
    #[serde(default)]
    pub assigned_to: Assignees,
    /// Priority.
    pub priority: Option<TaskPriority>,
    /// Initial status.
    pub status: Option<TaskStatus>,
    /// Due date.
    pub deadline: Option<DateTime<Utc>>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            assigned_to: req.assigned_to.into_vec(),
            priority: req.priority,
            status: req.status,
            deadline: req.deadline,
        }
    }
}

/// Update task request. `"deadline": null` clears the deadline; omitting it
/// leaves it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// Title.
    #[validate(length(min = 1, max = 300, message = "Task title cannot be empty"))]
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Priority.
    pub priority: Option<TaskPriority>,
    /// Deadline.
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<DateTime<Utc>>>,
    /// Status.
    pub status: Option<TaskStatus>,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            priority: req.priority,
            deadline: req.deadline,
            status: req.status,
        }
    }
}

/// Distinguish an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Status patch body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusRequest {
    /// New status.
    pub status: TaskStatus,
}

/// Append log request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppendLogRequest {
    /// Progress note.
    #[validate(length(min = 1, message = "Log content is required"))]
    pub content: String,
    /// Reported completion.
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress_percent: Option<i32>,
    /// Status to move the task to.
    pub status: Option<TaskStatus>,
}

impl From<AppendLogRequest> for AppendLog {
    fn from(req: AppendLogRequest) -> Self {
        Self {
            content: req.content,
            progress_percent: req.progress_percent,
            status: req.status,
        }
    }
}

/// `GET /tasks` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
}

impl From<TaskListQuery> for TaskFilter {
    fn from(q: TaskListQuery) -> Self {
        Self {
            project_id: q.project_id,
            status: q.status,
        }
    }
}

/// `GET /notifications` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Maximum number returned.
    pub limit: Option<u32>,
}

/// `GET /admin/audit` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSearchQuery {
    /// Restrict to one action.
    pub action: Option<AuditAction>,
    /// Restrict to one performer.
    pub performed_by: Option<Uuid>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one task.
    pub task_id: Option<Uuid>,
    /// Page number.
    pub page: Option<u64>,
    /// Page size.
    pub page_size: Option<u64>,
}

impl From<&AuditSearchQuery> for AuditSearch {
    fn from(q: &AuditSearchQuery) -> Self {
        Self {
            action: q.action,
            performed_by: q.performed_by,
            project_id: q.project_id,
            task_id: q.task_id,
        }
    }
}
