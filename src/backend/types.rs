//! Wire types for the record-storage backend

use crate::state_machine::state::{ProjectId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role as reported by the backend. Anything that is not `admin`
/// follows the worker path for menu purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Worker,
    Admin,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "worker" => Role::Worker,
            "admin" => Role::Admin,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.label().to_string()
    }
}

impl Role {
    pub fn label(&self) -> &str {
        match self {
            Role::Worker => "worker",
            Role::Admin => "admin",
            Role::Other(label) => label,
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

/// One selectable task of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: TaskId,
    pub name: String,
}

/// Structured fields of a daily-entry submission. The two photos travel
/// beside it as multipart attachments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDraft {
    pub user_id: UserId,
    pub task_id: TaskId,
    pub hours_worked: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The stored entry as echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntryRecord {
    pub id: i64,
    pub hours_worked: f64,
}

/// Worker row in the admin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub id: UserId,
    pub email: String,
}

/// One daily entry in a worker's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub hours_worked: f64,
}

/// Admin view of one worker and their entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerDetails {
    pub worker: WorkerSummary,
    #[serde(default)]
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopWorker {
    pub email: String,
    #[serde(default)]
    pub total_hours: f64,
}

/// Project-wide hour statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    #[serde(default)]
    pub average_hours: f64,
    #[serde(default)]
    pub max_hours: f64,
    #[serde(default)]
    pub top_workers: Vec<TopWorker>,
}
