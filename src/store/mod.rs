//! Per-session domain store.
//!
//! A `Store` holds one signed-in user's identity plus cached copies of the
//! task and application lists it may see. Every mutation goes to the backend
//! first and then re-fetches the affected cache in full, so the cache only
//! ever reflects state the backend has confirmed.

mod registry;

pub use registry::*;

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::Backend;
use crate::db::now_timestamp;
use crate::errors::AppError;
use crate::models::{
    Application, ApplicationScope, ApplicationStatus, AuthSession, NgoProfile, NgoRegistration,
    Role, Task, TaskChanges, TaskDraft, TaskScope, User, VolunteerProfile, VolunteerRegistration,
};

pub struct Store {
    backend: Arc<dyn Backend>,
    /// Token to restore on `initialize`, then the live session's token
    token: Option<String>,
    session: Option<AuthSession>,
    user: Option<User>,
    tasks: Vec<Task>,
    applications: Vec<Application>,
    initialized: bool,
}

impl Store {
    /// An empty, signed-out store.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            token: None,
            session: None,
            user: None,
            tasks: Vec::new(),
            applications: Vec::new(),
            initialized: false,
        }
    }

    /// A store that will restore `token` on `initialize`.
    pub fn with_token(backend: Arc<dyn Backend>, token: impl Into<String>) -> Self {
        let mut store = Self::new(backend);
        store.token = Some(token.into());
        store
    }

    // ==================== ACCESSORS ====================

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Ids of every task the cached applications point at.
    pub fn applied_task_ids(&self) -> HashSet<String> {
        self.applications.iter().map(|a| a.task_id.clone()).collect()
    }

    /// True when there is no session or it has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.session.as_ref().map_or(true, AuthSession::is_expired)
    }

    // ==================== SESSION LIFECYCLE ====================

    /// Restore the persisted session, load its profile and fill the caches.
    ///
    /// Calling it again after a successful run is a no-op. A session whose
    /// identity has no profile is signed out and the store is cleared.
    pub async fn initialize(&mut self) -> Result<(), AppError> {
        if self.initialized {
            return Ok(());
        }

        let Some(token) = self.token.clone() else {
            self.initialized = true;
            return Ok(());
        };

        let Some(session) = self.backend.get_session(&token).await? else {
            tracing::debug!("No live session for restored token");
            self.clear();
            self.initialized = true;
            return Ok(());
        };

        match self.load_user(&session.user_id).await? {
            Some(user) => self.establish(session, user).await,
            None => {
                tracing::warn!("Identity {} has no profile; signing out", session.user_id);
                self.discard_session(&session.token).await;
                self.clear();
                self.initialized = true;
                Ok(())
            }
        }
    }

    /// Sign in and load the profile for `role`.
    ///
    /// An account without a profile of that role is refused and its new
    /// session is signed out again.
    pub async fn login(&mut self, email: &str, password: &str, role: Role) -> Result<(), AppError> {
        let session = self.backend.sign_in(email, password).await?;

        let profile = match role {
            Role::Ngo => self
                .backend
                .get_ngo_profile(&session.user_id)
                .await
                .map(|p| p.map(User::Ngo)),
            Role::Volunteer => self
                .backend
                .get_volunteer_profile(&session.user_id)
                .await
                .map(|p| p.map(User::Volunteer)),
        };

        match profile {
            Ok(Some(user)) => {
                tracing::info!("{} signed in as {}", session.email, role.as_str());
                self.open_fresh(session, user).await
            }
            Ok(None) => {
                self.discard_session(&session.token).await;
                Err(AppError::Auth(format!(
                    "No {} profile found for this account",
                    role.as_str()
                )))
            }
            Err(err) => {
                self.discard_session(&session.token).await;
                Err(err)
            }
        }
    }

    pub async fn register_ngo(&mut self, registration: NgoRegistration) -> Result<(), AppError> {
        let session = self
            .backend
            .sign_up(&registration.email, &registration.password)
            .await
            .map_err(AppError::into_registration)?;

        let profile = registration.into_profile(session.user_id.clone(), now_timestamp());
        if let Err(err) = self.backend.insert_ngo_profile(&profile).await {
            self.compensate(&session).await;
            return Err(err.into_registration());
        }

        tracing::info!("Registered NGO {}", profile.organization_name);
        self.open_fresh(session, User::Ngo(profile)).await
    }

    pub async fn register_volunteer(
        &mut self,
        registration: VolunteerRegistration,
    ) -> Result<(), AppError> {
        let session = self
            .backend
            .sign_up(&registration.email, &registration.password)
            .await
            .map_err(AppError::into_registration)?;

        let profile = registration.into_profile(session.user_id.clone(), now_timestamp());
        if let Err(err) = self.backend.insert_volunteer_profile(&profile).await {
            self.compensate(&session).await;
            return Err(err.into_registration());
        }

        tracing::info!("Registered volunteer {} {}", profile.first_name, profile.last_name);
        self.open_fresh(session, User::Volunteer(profile)).await
    }

    /// Sign out on the backend if possible; local state is always cleared.
    pub async fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            self.discard_session(&session.token).await;
        }
        self.clear();
    }

    // ==================== TASK MUTATIONS ====================

    /// Publish a new active task; returns its id.
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<String, AppError> {
        let ngo_id = self.require_ngo()?.id.clone();

        let id = self
            .backend
            .insert_task(&ngo_id, &draft)
            .await
            .map_err(AppError::into_mutation)?;

        self.refresh_tasks().await?;
        Ok(id)
    }

    pub async fn update_task(&mut self, task_id: &str, changes: TaskChanges) -> Result<(), AppError> {
        let ngo_id = self.require_ngo()?.id.clone();

        self.backend
            .update_task(&ngo_id, task_id, &changes)
            .await
            .map_err(AppError::into_mutation)?;

        self.refresh_tasks().await
    }

    /// Delete a task; its applications go with it.
    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), AppError> {
        let ngo_id = self.require_ngo()?.id.clone();

        self.backend
            .delete_task(&ngo_id, task_id)
            .await
            .map_err(AppError::into_mutation)?;

        self.refresh_tasks().await?;
        self.refresh_applications().await
    }

    // ==================== APPLICATION MUTATIONS ====================

    /// Apply to a cached task; returns the new application id.
    ///
    /// Duplicate applications are not checked here; callers consult
    /// `applied_task_ids` and the backend rejects the rest.
    pub async fn apply_to_task(
        &mut self,
        task_id: &str,
        message: Option<String>,
    ) -> Result<String, AppError> {
        let volunteer_id = self.require_volunteer()?.id.clone();

        if self.task(task_id).is_none() {
            return Err(AppError::NotFound(format!("Task {} not found", task_id)));
        }

        let id = self
            .backend
            .insert_application(&volunteer_id, task_id, message.as_deref())
            .await
            .map_err(AppError::into_mutation)?;

        self.refresh_applications().await?;
        Ok(id)
    }

    /// Accept or reject a pending application to one of this NGO's tasks.
    pub async fn update_application_status(
        &mut self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<(), AppError> {
        let ngo_id = self.require_ngo()?.id.clone();

        if !status.is_terminal() {
            return Err(AppError::validation(
                "Applications can only be accepted or rejected",
            ));
        }

        self.backend
            .update_application_status(&ngo_id, application_id, status)
            .await
            .map_err(AppError::into_mutation)?;

        self.refresh_applications().await
    }

    // ==================== CACHE REFRESH ====================

    /// Re-fetch the task cache. On failure the previous cache is kept.
    pub async fn refresh_tasks(&mut self) -> Result<(), AppError> {
        let Some(scope) = self.task_scope() else {
            return Ok(());
        };
        self.tasks = self.backend.fetch_tasks(&scope).await?;
        Ok(())
    }

    /// Re-fetch the application cache. On failure the previous cache is kept.
    pub async fn refresh_applications(&mut self) -> Result<(), AppError> {
        let Some(scope) = self.application_scope() else {
            return Ok(());
        };
        self.applications = self.backend.fetch_applications(&scope).await?;
        Ok(())
    }

    fn task_scope(&self) -> Option<TaskScope> {
        match self.user.as_ref()? {
            User::Ngo(ngo) => Some(TaskScope::OwnedBy(ngo.id.clone())),
            User::Volunteer(_) => Some(TaskScope::Active),
        }
    }

    fn application_scope(&self) -> Option<ApplicationScope> {
        match self.user.as_ref()? {
            User::Ngo(ngo) => Some(ApplicationScope::Ngo(ngo.id.clone())),
            User::Volunteer(volunteer) => Some(ApplicationScope::Volunteer(volunteer.id.clone())),
        }
    }

    // ==================== HELPERS ====================

    fn require_ngo(&self) -> Result<&NgoProfile, AppError> {
        match &self.user {
            Some(User::Ngo(ngo)) => Ok(ngo),
            Some(User::Volunteer(_)) => Err(AppError::Forbidden(
                "Only NGOs can manage tasks and applications".to_string(),
            )),
            None => Err(AppError::Unauthorized("Not signed in".to_string())),
        }
    }

    fn require_volunteer(&self) -> Result<&VolunteerProfile, AppError> {
        match &self.user {
            Some(User::Volunteer(volunteer)) => Ok(volunteer),
            Some(User::Ngo(_)) => Err(AppError::Forbidden(
                "Only volunteers can apply to tasks".to_string(),
            )),
            None => Err(AppError::Unauthorized("Not signed in".to_string())),
        }
    }

    /// NGO profile first, then volunteer.
    async fn load_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        if let Some(ngo) = self.backend.get_ngo_profile(user_id).await? {
            return Ok(Some(User::Ngo(ngo)));
        }
        Ok(self
            .backend
            .get_volunteer_profile(user_id)
            .await?
            .map(User::Volunteer))
    }

    async fn establish(&mut self, session: AuthSession, user: User) -> Result<(), AppError> {
        self.clear();
        self.token = Some(session.token.clone());
        self.session = Some(session);
        self.user = Some(user);
        self.refresh_tasks().await?;
        self.refresh_applications().await?;
        self.initialized = true;
        Ok(())
    }

    /// Establish a session this store just opened; it is signed out again
    /// if the caches cannot be loaded.
    async fn open_fresh(&mut self, session: AuthSession, user: User) -> Result<(), AppError> {
        let token = session.token.clone();
        if let Err(err) = self.establish(session, user).await {
            tracing::warn!("Could not load caches for new session: {}", err);
            self.discard_session(&token).await;
            self.clear();
            return Err(err);
        }
        Ok(())
    }

    async fn discard_session(&self, token: &str) {
        if let Err(err) = self.backend.sign_out(token).await {
            tracing::warn!("Sign-out failed: {}", err);
        }
    }

    async fn compensate(&self, session: &AuthSession) {
        tracing::warn!("Profile insert failed; removing identity {}", session.user_id);
        if let Err(err) = self.backend.delete_identity(&session.user_id).await {
            tracing::error!("Could not remove orphaned identity {}: {}", session.user_id, err);
        }
    }

    fn clear(&mut self) {
        self.token = None;
        self.session = None;
        self.user = None;
        self.tasks.clear();
        self.applications.clear();
        self.initialized = false;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{CauseArea, NgoRegistration, Skill, TaskDraft, VolunteerRegistration};

    pub fn ngo_registration(email: &str) -> NgoRegistration {
        NgoRegistration {
            email: email.to_string(),
            password: "password123".to_string(),
            organization_name: "Hope Foundation".to_string(),
            contact_person: "Rajesh Kumar".to_string(),
            phone: "+91 98765 43210".to_string(),
            city: "Mumbai".to_string(),
            description: "Empowering communities through education and healthcare since 2015."
                .to_string(),
            cause_areas: vec![CauseArea::EducationLiteracy, CauseArea::HealthcareMedical],
            website: Some("https://hopefoundation.org".to_string()),
            logo: None,
        }
    }

    pub fn volunteer_registration(email: &str, city: &str, skills: &[Skill]) -> VolunteerRegistration {
        VolunteerRegistration {
            email: email.to_string(),
            password: "password123".to_string(),
            first_name: "Priya".to_string(),
            last_name: "Sharma".to_string(),
            phone: "+91 98765 43211".to_string(),
            city: city.to_string(),
            bio: Some("Teacher by day, volunteer on weekends.".to_string()),
            skills: skills.to_vec(),
            availability: Some("Weekends".to_string()),
            profile_photo: None,
        }
    }

    pub fn task_draft(title: &str, location: &str, skills: &[Skill]) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "We are looking for passionate volunteers to help children from \
                          underprivileged backgrounds in our community centre every week."
                .to_string(),
            cause_area: CauseArea::EducationLiteracy,
            required_skills: skills.to_vec(),
            location: location.to_string(),
            hours_per_week: 5,
            duration_months: 6,
        }
    }
}
