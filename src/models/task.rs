//! Task (volunteer opportunity) model.

use serde::{Deserialize, Serialize};

use super::{CauseArea, Skill};

/// Publication state of a task. Only active tasks are shown to volunteers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Inactive,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(TaskStatus::Active),
            "inactive" => Some(TaskStatus::Inactive),
            _ => None,
        }
    }
}

/// Owning NGO fields joined onto each task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoSummary {
    pub organization_name: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// A volunteer opportunity published by an NGO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub ngo_id: String,
    pub ngo: NgoSummary,
    pub title: String,
    pub description: String,
    pub cause_area: CauseArea,
    pub required_skills: Vec<Skill>,
    pub location: String,
    pub hours_per_week: i64,
    pub duration_months: i64,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active
    }

    pub fn requires_any(&self, skills: &[Skill]) -> bool {
        skills.iter().any(|skill| self.required_skills.contains(skill))
    }
}

/// Validated data for a new task. New tasks are always active.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub cause_area: CauseArea,
    pub required_skills: Vec<Skill>,
    pub location: String,
    pub hours_per_week: i64,
    pub duration_months: i64,
}

/// Validated partial update of a task. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cause_area: Option<CauseArea>,
    pub required_skills: Option<Vec<Skill>>,
    pub location: Option<String>,
    pub hours_per_week: Option<i64>,
    pub duration_months: Option<i64>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        *self == TaskChanges::default()
    }
}

/// Which tasks a fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// Every active task, across all NGOs
    Active,
    /// Every task owned by one NGO, whatever its status
    OwnedBy(String),
}

/// Request body for creating a new task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub cause_area: String,
    pub required_skills: Vec<String>,
    pub location: String,
    pub hours_per_week: i64,
    pub duration_months: i64,
}

/// Request body for updating an existing task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cause_area: Option<String>,
    #[serde(default)]
    pub required_skills: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub hours_per_week: Option<i64>,
    #[serde(default)]
    pub duration_months: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An NGO's task with the review counts shown on its task list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOverview {
    #[serde(flatten)]
    pub task: Task,
    pub application_count: usize,
    pub accepted_count: usize,
    pub pending_count: usize,
}
