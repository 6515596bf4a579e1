//! Per-role dashboard statistics computed from a store's caches.

use std::collections::HashSet;

use serde::Serialize;

use crate::filters::recommend_tasks;
use crate::models::{
    Application, ApplicationQuery, ApplicationStatus, Task, TaskOverview, VolunteerProfile,
};

/// Number of recent tasks shown on the NGO dashboard.
pub const RECENT_TASKS: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NgoDashboard {
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub pending_applications: usize,
    pub recent_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDashboard {
    pub submitted: usize,
    pub accepted: usize,
    pub pending: usize,
    pub rejected: usize,
    pub recommended: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Ngo(NgoDashboard),
    Volunteer(VolunteerDashboard),
}

fn count_status(applications: &[Application], status: ApplicationStatus) -> usize {
    applications.iter().filter(|a| a.status == status).count()
}

/// Stats over an NGO's own tasks and the applications to them.
pub fn ngo_dashboard(tasks: &[Task], applications: &[Application]) -> NgoDashboard {
    let mut recent: Vec<Task> = tasks.to_vec();
    // Stable sort: tasks created in the same instant keep list order
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(RECENT_TASKS);

    NgoDashboard {
        total_tasks: tasks.len(),
        active_tasks: tasks.iter().filter(|t| t.is_active()).count(),
        pending_applications: count_status(applications, ApplicationStatus::Pending),
        recent_tasks: recent,
    }
}

pub fn volunteer_dashboard(
    tasks: &[Task],
    applications: &[Application],
    volunteer: &VolunteerProfile,
) -> VolunteerDashboard {
    let applied: HashSet<String> = applications.iter().map(|a| a.task_id.clone()).collect();

    VolunteerDashboard {
        submitted: applications.len(),
        accepted: count_status(applications, ApplicationStatus::Accepted),
        pending: count_status(applications, ApplicationStatus::Pending),
        rejected: count_status(applications, ApplicationStatus::Rejected),
        recommended: recommend_tasks(tasks, volunteer, &applied)
            .into_iter()
            .cloned()
            .collect(),
    }
}

/// Each task with its application counts, in task list order.
pub fn task_overviews(tasks: &[Task], applications: &[Application]) -> Vec<TaskOverview> {
    tasks
        .iter()
        .map(|task| {
            let for_task: Vec<&Application> =
                applications.iter().filter(|a| a.task_id == task.id).collect();
            TaskOverview {
                task: task.clone(),
                application_count: for_task.len(),
                accepted_count: for_task
                    .iter()
                    .filter(|a| a.status == ApplicationStatus::Accepted)
                    .count(),
                pending_count: for_task
                    .iter()
                    .filter(|a| a.status == ApplicationStatus::Pending)
                    .count(),
            }
        })
        .collect()
}

/// Narrow the application list by status tab and task.
pub fn filter_applications<'a>(
    applications: &'a [Application],
    query: &ApplicationQuery,
) -> Vec<&'a Application> {
    applications
        .iter()
        .filter(|a| query.status.map_or(true, |s| a.status == s))
        .filter(|a| query.task_id.as_deref().map_or(true, |id| a.task_id == id))
        .collect()
}
