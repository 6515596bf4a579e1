//! Dashboard recommendations for volunteers.

use std::collections::HashSet;

use crate::models::{Task, VolunteerProfile};

/// Upper bound on recommendations shown on the volunteer dashboard.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Pick active, not-yet-applied tasks near the volunteer or matching their skills.
///
/// No ranking: the first matches in list order win.
pub fn recommend_tasks<'a>(
    tasks: &'a [Task],
    volunteer: &VolunteerProfile,
    applied_task_ids: &HashSet<String>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.is_active() && !applied_task_ids.contains(&task.id))
        .filter(|task| task.location == volunteer.city || task.requires_any(&volunteer.skills))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
