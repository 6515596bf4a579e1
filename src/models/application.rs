//! Application model: a volunteer's request to join a task.

use serde::{Deserialize, Serialize};

use super::Skill;

/// Review state. `Pending` is the only state that may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

/// Volunteer profile fields joined onto each application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerSummary {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub skills: Vec<Skill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

/// Task fields joined onto each application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub title: String,
    pub ngo_id: String,
    pub organization_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub task_id: String,
    pub volunteer_id: String,
    pub volunteer: VolunteerSummary,
    pub task: TaskSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<String>,
}

/// Which applications a fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    /// Applications submitted by one volunteer
    Volunteer(String),
    /// Applications to any task owned by one NGO
    Ngo(String),
}

/// Request body for `POST /api/tasks/{id}/apply`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for `PUT /api/applications/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

/// Query string for `GET /api/applications`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub task_id: Option<String>,
}
