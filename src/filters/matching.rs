//! Browse-page task matching.

use serde::Deserialize;

use crate::errors::{AppError, FieldError};
use crate::models::{CauseArea, Skill, Task, REMOTE};

/// Criteria for narrowing the task board. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub search: String,
    pub city: Option<String>,
    pub cause_area: Option<CauseArea>,
    pub skills: Vec<Skill>,
}

impl TaskFilter {
    /// Whether an active task satisfies every non-empty criterion.
    pub fn matches(&self, task: &Task) -> bool {
        if !task.is_active() {
            return false;
        }

        let search = self.search.to_lowercase();
        if !search.is_empty()
            && !(task.title.to_lowercase().contains(&search)
                || task.description.to_lowercase().contains(&search)
                || task.cause_area.as_str().to_lowercase().contains(&search))
        {
            return false;
        }

        if let Some(city) = &self.city {
            if task.location != *city && task.location != REMOTE {
                return false;
            }
        }

        if let Some(area) = self.cause_area {
            if task.cause_area != area {
                return false;
            }
        }

        self.skills.is_empty() || task.requires_any(&self.skills)
    }
}

/// Apply a filter, keeping the input order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Query string for `GET /api/tasks`. Skills are comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub cause_area: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
}

impl TryFrom<TaskQuery> for TaskFilter {
    type Error = AppError;

    fn try_from(query: TaskQuery) -> Result<Self, Self::Error> {
        let mut fields = Vec::new();

        let city = query
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let cause_area = match query.cause_area.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => {
                let parsed = CauseArea::parse(name);
                if parsed.is_none() {
                    fields.push(FieldError::new("causeArea", format!("Unknown cause area {:?}", name)));
                }
                parsed
            }
        };

        let mut skills = Vec::new();
        for name in query
            .skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match Skill::parse(name) {
                Some(skill) if !skills.contains(&skill) => skills.push(skill),
                Some(_) => {}
                None => fields.push(FieldError::new("skills", format!("Unknown skill {:?}", name))),
            }
        }

        if !fields.is_empty() {
            return Err(AppError::Validation {
                message: "Invalid task filter".to_string(),
                fields,
            });
        }

        Ok(TaskFilter {
            search: query.search.unwrap_or_default(),
            city,
            cause_area,
            skills,
        })
    }
}
