//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Every write that
//! belongs to a role is scoped to the acting identity, so rows owned by someone
//! else behave as if they did not exist.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::now_timestamp;
use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::{
    Application, ApplicationScope, ApplicationStatus, AuthSession, CauseArea, NgoProfile,
    NgoSummary, Task, TaskChanges, TaskDraft, TaskScope, TaskStatus, TaskSummary,
    VolunteerProfile, VolunteerSummary,
};

const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

const TASK_SELECT: &str = r#"SELECT t.id, t.ngo_id, t.title, t.description, t.cause_area,
                  t.required_skills, t.location, t.hours_per_week, t.duration_months,
                  t.status, t.created_at, t.updated_at,
                  n.organization_name, n.city AS ngo_city, n.logo AS ngo_logo
           FROM tasks t JOIN ngo_profiles n ON n.id = t.ngo_id"#;

const APPLICATION_SELECT: &str = r#"SELECT a.id, a.task_id, a.volunteer_id, a.message, a.status,
                  a.applied_at, a.responded_at,
                  v.first_name, v.last_name, v.city AS volunteer_city,
                  v.skills AS volunteer_skills, v.profile_photo,
                  t.title AS task_title, t.ngo_id, t.location AS task_location,
                  n.organization_name
           FROM applications a
           JOIN volunteer_profiles v ON v.id = a.volunteer_id
           JOIN tasks t ON t.id = a.task_id
           JOIN ngo_profiles n ON n.id = t.ngo_id"#;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
    pub(super) session_ttl_hours: i64,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }

    pub fn with_session_ttl_hours(mut self, hours: i64) -> Self {
        self.session_ttl_hours = hours;
        self
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Insert an NGO profile row.
    pub async fn create_ngo_profile(&self, profile: &NgoProfile) -> Result<(), AppError> {
        let cause_areas_json = serde_json::to_string(&profile.cause_areas)?;

        sqlx::query(
            r#"INSERT INTO ngo_profiles (
                id, organization_name, contact_person, phone, city, description,
                cause_areas, website, logo, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&profile.id)
        .bind(&profile.organization_name)
        .bind(&profile.contact_person)
        .bind(&profile.phone)
        .bind(&profile.city)
        .bind(&profile.description)
        .bind(&cause_areas_json)
        .bind(&profile.website)
        .bind(&profile.logo)
        .bind(&profile.created_at)
        .bind(&profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a volunteer profile row.
    pub async fn create_volunteer_profile(
        &self,
        profile: &VolunteerProfile,
    ) -> Result<(), AppError> {
        let skills_json = serde_json::to_string(&profile.skills)?;

        sqlx::query(
            r#"INSERT INTO volunteer_profiles (
                id, first_name, last_name, phone, city, bio, skills,
                availability, profile_photo, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&profile.id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.city)
        .bind(&profile.bio)
        .bind(&skills_json)
        .bind(&profile.availability)
        .bind(&profile.profile_photo)
        .bind(&profile.created_at)
        .bind(&profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get an NGO profile by identity.
    pub async fn find_ngo_profile(&self, id: &str) -> Result<Option<NgoProfile>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, organization_name, contact_person, phone, city, description,
                      cause_areas, website, logo, created_at, updated_at
               FROM ngo_profiles WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(ngo_profile_from_row).transpose()
    }

    /// Get a volunteer profile by identity.
    pub async fn find_volunteer_profile(
        &self,
        id: &str,
    ) -> Result<Option<VolunteerProfile>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, first_name, last_name, phone, city, bio, skills,
                      availability, profile_photo, created_at, updated_at
               FROM volunteer_profiles WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(volunteer_profile_from_row).transpose()
    }

    // ==================== TASK OPERATIONS ====================

    /// List tasks in creation order.
    pub async fn list_tasks(&self, scope: &TaskScope) -> Result<Vec<Task>, AppError> {
        let (filter, owner) = match scope {
            TaskScope::Active => ("t.status = 'active'", None),
            TaskScope::OwnedBy(ngo_id) => ("t.ngo_id = ?", Some(ngo_id)),
        };
        let sql = format!("{TASK_SELECT} WHERE {filter} ORDER BY t.created_at, t.rowid");

        let mut query = sqlx::query(&sql);
        if let Some(ngo_id) = owner {
            query = query.bind(ngo_id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(task_from_row).collect()
    }

    /// Get a task by ID, visible only to its owner.
    pub async fn get_owned_task(&self, ngo_id: &str, id: &str) -> Result<Option<Task>, AppError> {
        let sql = format!("{TASK_SELECT} WHERE t.id = ? AND t.ngo_id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(ngo_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    /// Create a new active task.
    pub async fn create_task(&self, ngo_id: &str, draft: &TaskDraft) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        let skills_json = serde_json::to_string(&draft.required_skills)?;

        sqlx::query(
            r#"INSERT INTO tasks (
                id, ngo_id, title, description, cause_area, required_skills, location,
                hours_per_week, duration_months, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(ngo_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.cause_area.as_str())
        .bind(&skills_json)
        .bind(&draft.location)
        .bind(draft.hours_per_week)
        .bind(draft.duration_months)
        .bind(TaskStatus::Active.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!("NGO {} created task {}", ngo_id, id);
        Ok(id)
    }

    /// Apply a partial update to a task owned by `ngo_id`.
    pub async fn modify_task(
        &self,
        ngo_id: &str,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<(), AppError> {
        let existing = self
            .get_owned_task(ngo_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

        let now = now_timestamp();

        let title = changes.title.as_ref().unwrap_or(&existing.title);
        let description = changes.description.as_ref().unwrap_or(&existing.description);
        let cause_area = changes.cause_area.unwrap_or(existing.cause_area);
        let required_skills = changes
            .required_skills
            .as_ref()
            .unwrap_or(&existing.required_skills);
        let location = changes.location.as_ref().unwrap_or(&existing.location);
        let hours_per_week = changes.hours_per_week.unwrap_or(existing.hours_per_week);
        let duration_months = changes.duration_months.unwrap_or(existing.duration_months);
        let status = changes.status.unwrap_or(existing.status);
        let skills_json = serde_json::to_string(required_skills)?;

        let result = sqlx::query(
            r#"UPDATE tasks SET
                title = ?, description = ?, cause_area = ?, required_skills = ?, location = ?,
                hours_per_week = ?, duration_months = ?, status = ?, updated_at = ?
            WHERE id = ? AND ngo_id = ?"#,
        )
        .bind(title)
        .bind(description)
        .bind(cause_area.as_str())
        .bind(&skills_json)
        .bind(location)
        .bind(hours_per_week)
        .bind(duration_months)
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .bind(ngo_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        Ok(())
    }

    /// Delete a task owned by `ngo_id` together with its applications.
    pub async fn remove_task(&self, ngo_id: &str, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query("SELECT id FROM tasks WHERE id = ? AND ngo_id = ?")
            .bind(id)
            .bind(ngo_id)
            .fetch_optional(&mut *tx)
            .await?;
        if owned.is_none() {
            return Err(AppError::NotFound(format!("Task {} not found", id)));
        }

        let removed = sqlx::query("DELETE FROM applications WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tasks WHERE id = ? AND ngo_id = ?")
            .bind(id)
            .bind(ngo_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "NGO {} deleted task {} and {} application(s)",
            ngo_id,
            id,
            removed.rows_affected()
        );
        Ok(())
    }

    // ==================== APPLICATION OPERATIONS ====================

    /// List applications in submission order.
    pub async fn list_applications(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<Application>, AppError> {
        let (filter, owner) = match scope {
            ApplicationScope::Volunteer(id) => ("a.volunteer_id = ?", id),
            ApplicationScope::Ngo(id) => ("t.ngo_id = ?", id),
        };

        let sql = format!("{APPLICATION_SELECT} WHERE {filter} ORDER BY a.applied_at, a.rowid");
        let rows = sqlx::query(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(application_from_row).collect()
    }

    /// Submit a pending application to an active task.
    pub async fn create_application(
        &self,
        volunteer_id: &str,
        task_id: &str,
        message: Option<&str>,
    ) -> Result<String, AppError> {
        let task = sqlx::query("SELECT status FROM tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

        let status: String = task.try_get("status")?;
        if TaskStatus::parse(&status) != Some(TaskStatus::Active) {
            return Err(AppError::Conflict(format!(
                "Task {} is not accepting applications",
                task_id
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();

        sqlx::query(
            r#"INSERT INTO applications (id, task_id, volunteer_id, message, status, applied_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(task_id)
        .bind(volunteer_id)
        .bind(message)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict("You have already applied to this task".to_string())
            }
            other => other,
        })?;

        tracing::info!("Volunteer {} applied to task {}", volunteer_id, task_id);
        Ok(id)
    }

    /// Move a pending application on one of `ngo_id`'s tasks to a terminal status.
    pub async fn set_application_status(
        &self,
        ngo_id: &str,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        if !status.is_terminal() {
            return Err(AppError::validation(
                "Applications can only be accepted or rejected",
            ));
        }

        let now = now_timestamp();

        let result = sqlx::query(
            r#"UPDATE applications SET status = ?, responded_at = ?
               WHERE id = ? AND status = 'pending'
                 AND task_id IN (SELECT id FROM tasks WHERE ngo_id = ?)"#,
        )
        .bind(status.as_str())
        .bind(&now)
        .bind(id)
        .bind(ngo_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current = sqlx::query(
                r#"SELECT a.status FROM applications a JOIN tasks t ON t.id = a.task_id
                   WHERE a.id = ? AND t.ngo_id = ?"#,
            )
            .bind(id)
            .bind(ngo_id)
            .fetch_optional(&self.pool)
            .await?;

            return Err(match current {
                None => AppError::NotFound(format!("Application {} not found", id)),
                Some(row) => {
                    let current: String = row.try_get("status")?;
                    AppError::Conflict(format!("Application {} is already {}", id, current))
                }
            });
        }

        tracing::info!("NGO {} marked application {} {}", ngo_id, id, status.as_str());
        Ok(())
    }
}

#[async_trait]
impl Backend for Repository {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        self.create_identity(email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        self.authenticate(email, password).await
    }

    async fn sign_out(&self, token: &str) -> Result<(), AppError> {
        self.close_session(token).await
    }

    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>, AppError> {
        self.find_session(token).await
    }

    async fn delete_identity(&self, user_id: &str) -> Result<(), AppError> {
        self.remove_identity(user_id).await
    }

    async fn insert_ngo_profile(&self, profile: &NgoProfile) -> Result<(), AppError> {
        self.create_ngo_profile(profile).await
    }

    async fn insert_volunteer_profile(&self, profile: &VolunteerProfile) -> Result<(), AppError> {
        self.create_volunteer_profile(profile).await
    }

    async fn get_ngo_profile(&self, id: &str) -> Result<Option<NgoProfile>, AppError> {
        self.find_ngo_profile(id).await
    }

    async fn get_volunteer_profile(&self, id: &str) -> Result<Option<VolunteerProfile>, AppError> {
        self.find_volunteer_profile(id).await
    }

    async fn fetch_tasks(&self, scope: &TaskScope) -> Result<Vec<Task>, AppError> {
        self.list_tasks(scope).await
    }

    async fn insert_task(&self, ngo_id: &str, draft: &TaskDraft) -> Result<String, AppError> {
        self.create_task(ngo_id, draft).await
    }

    async fn update_task(
        &self,
        ngo_id: &str,
        task_id: &str,
        changes: &TaskChanges,
    ) -> Result<(), AppError> {
        self.modify_task(ngo_id, task_id, changes).await
    }

    async fn delete_task(&self, ngo_id: &str, task_id: &str) -> Result<(), AppError> {
        self.remove_task(ngo_id, task_id).await
    }

    async fn insert_application(
        &self,
        volunteer_id: &str,
        task_id: &str,
        message: Option<&str>,
    ) -> Result<String, AppError> {
        self.create_application(volunteer_id, task_id, message).await
    }

    async fn fetch_applications(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<Application>, AppError> {
        self.list_applications(scope).await
    }

    async fn update_application_status(
        &self,
        ngo_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        self.set_application_status(ngo_id, application_id, status)
            .await
    }
}

// Helper functions for row conversion

fn ngo_profile_from_row(row: &SqliteRow) -> Result<NgoProfile, AppError> {
    let cause_areas: String = row.try_get("cause_areas")?;
    Ok(NgoProfile {
        id: row.try_get("id")?,
        organization_name: row.try_get("organization_name")?,
        contact_person: row.try_get("contact_person")?,
        phone: row.try_get("phone")?,
        city: row.try_get("city")?,
        description: row.try_get("description")?,
        cause_areas: parse_json_list(&cause_areas)?,
        website: row.try_get("website")?,
        logo: row.try_get("logo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn volunteer_profile_from_row(row: &SqliteRow) -> Result<VolunteerProfile, AppError> {
    let skills: String = row.try_get("skills")?;
    Ok(VolunteerProfile {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        city: row.try_get("city")?,
        bio: row.try_get("bio")?,
        skills: parse_json_list(&skills)?,
        availability: row.try_get("availability")?,
        profile_photo: row.try_get("profile_photo")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, AppError> {
    let cause_area: String = row.try_get("cause_area")?;
    let required_skills: String = row.try_get("required_skills")?;
    let status: String = row.try_get("status")?;

    Ok(Task {
        id: row.try_get("id")?,
        ngo_id: row.try_get("ngo_id")?,
        ngo: NgoSummary {
            organization_name: row.try_get("organization_name")?,
            city: row.try_get("ngo_city")?,
            logo: row.try_get("ngo_logo")?,
        },
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        cause_area: CauseArea::parse(&cause_area)
            .ok_or_else(|| AppError::Internal(format!("Unknown cause area {:?}", cause_area)))?,
        required_skills: parse_json_list(&required_skills)?,
        location: row.try_get("location")?,
        hours_per_week: row.try_get("hours_per_week")?,
        duration_months: row.try_get("duration_months")?,
        status: TaskStatus::parse(&status)
            .ok_or_else(|| AppError::Internal(format!("Unknown task status {:?}", status)))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn application_from_row(row: &SqliteRow) -> Result<Application, AppError> {
    let status: String = row.try_get("status")?;
    let volunteer_skills: String = row.try_get("volunteer_skills")?;

    Ok(Application {
        id: row.try_get("id")?,
        task_id: row.try_get("task_id")?,
        volunteer_id: row.try_get("volunteer_id")?,
        volunteer: VolunteerSummary {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            city: row.try_get("volunteer_city")?,
            skills: parse_json_list(&volunteer_skills)?,
            profile_photo: row.try_get("profile_photo")?,
        },
        task: TaskSummary {
            title: row.try_get("task_title")?,
            ngo_id: row.try_get("ngo_id")?,
            organization_name: row.try_get("organization_name")?,
            location: row.try_get("task_location")?,
        },
        message: row.try_get("message")?,
        status: ApplicationStatus::parse(&status).ok_or_else(|| {
            AppError::Internal(format!("Unknown application status {:?}", status))
        })?,
        applied_at: row.try_get("applied_at")?,
        responded_at: row.try_get("responded_at")?,
    })
}

fn parse_json_list<T: DeserializeOwned>(s: &str) -> Result<Vec<T>, AppError> {
    serde_json::from_str(s)
        .map_err(|e| AppError::Internal(format!("Corrupt list column {:?}: {}", s, e)))
}
