//! The backend surface the session store talks to.
//!
//! Authentication plus the four marketplace tables. Write operations take the
//! acting identity so implementations can apply ownership policies the way a
//! row-level-secured hosted database would.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    Application, ApplicationScope, ApplicationStatus, AuthSession, NgoProfile, Task, TaskChanges,
    TaskDraft, TaskScope, VolunteerProfile,
};

#[async_trait]
pub trait Backend: Send + Sync {
    // ---- authentication ----

    /// Create a new identity and open a session for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    /// Open a session for existing credentials. Fails with `AppError::Auth`.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AppError>;

    async fn sign_out(&self, token: &str) -> Result<(), AppError>;

    /// Look up an unexpired session.
    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>, AppError>;

    /// Remove an identity together with its sessions.
    async fn delete_identity(&self, user_id: &str) -> Result<(), AppError>;

    // ---- profiles ----

    async fn insert_ngo_profile(&self, profile: &NgoProfile) -> Result<(), AppError>;

    async fn insert_volunteer_profile(&self, profile: &VolunteerProfile) -> Result<(), AppError>;

    async fn get_ngo_profile(&self, id: &str) -> Result<Option<NgoProfile>, AppError>;

    async fn get_volunteer_profile(&self, id: &str) -> Result<Option<VolunteerProfile>, AppError>;

    // ---- tasks ----

    async fn fetch_tasks(&self, scope: &TaskScope) -> Result<Vec<Task>, AppError>;

    /// Insert an active task owned by `ngo_id`; returns the new task id.
    async fn insert_task(&self, ngo_id: &str, draft: &TaskDraft) -> Result<String, AppError>;

    async fn update_task(
        &self,
        ngo_id: &str,
        task_id: &str,
        changes: &TaskChanges,
    ) -> Result<(), AppError>;

    /// Delete a task and every application referencing it.
    async fn delete_task(&self, ngo_id: &str, task_id: &str) -> Result<(), AppError>;

    // ---- applications ----

    /// Insert a pending application; returns the new application id.
    async fn insert_application(
        &self,
        volunteer_id: &str,
        task_id: &str,
        message: Option<&str>,
    ) -> Result<String, AppError>;

    async fn fetch_applications(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<Application>, AppError>;

    /// Move a pending application to a terminal status.
    async fn update_application_status(
        &self,
        ngo_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError>;
}
