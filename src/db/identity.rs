//! Identity and session storage: the authentication half of the backend.

use chrono::{Duration, SecondsFormat, Utc};
use sqlx::{Row, Sqlite, Transaction};

use super::{now_timestamp, Repository};
use crate::auth::password;
use crate::errors::AppError;
use crate::models::AuthSession;

/// Emails are compared case-insensitively and without surrounding whitespace.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Run CPU-heavy password work off the async workers.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))
}

impl Repository {
    /// Create a user row and an initial session in one transaction.
    pub async fn create_identity(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Registration(
                "An account with this email already exists".to_string(),
            ));
        }

        let user_id = uuid::Uuid::new_v4().to_string();
        let plain = password.to_string();
        let hash = run_blocking(move || password::hash_password(&plain)).await??;
        let now = now_timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(&user_id)
            .bind(&email)
            .bind(&hash)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let session = self.open_session(&mut tx, &user_id, &email).await?;

        tx.commit().await?;

        tracing::info!("Created identity {} for {}", user_id, email);
        Ok(session)
    }

    /// Verify credentials and open a new session.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email);

        let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AppError::Auth("Invalid login credentials".to_string()));
        };

        let user_id: String = row.try_get("id")?;
        let hash: String = row.try_get("password_hash")?;

        let plain = password.to_string();
        if !run_blocking(move || password::verify_password(&plain, &hash)).await? {
            return Err(AppError::Auth("Invalid login credentials".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let session = self.open_session(&mut tx, &user_id, &email).await?;
        tx.commit().await?;

        Ok(session)
    }

    /// Delete a session token. Unknown tokens are ignored.
    pub async fn close_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Look up a session, purging it if it has expired.
    pub async fn find_session(&self, token: &str) -> Result<Option<AuthSession>, AppError> {
        let row = sqlx::query(
            r#"SELECT s.token, s.user_id, u.email, s.created_at, s.expires_at
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session = AuthSession {
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        };

        if session.is_expired() {
            tracing::debug!("Session for {} expired at {}", session.user_id, session.expires_at);
            self.close_session(token).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Remove a user; sessions and profiles cascade.
    pub async fn remove_identity(&self, user_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        tracing::info!("Removed identity {}", user_id);
        Ok(())
    }

    async fn open_session(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: &str,
        email: &str,
    ) -> Result<AuthSession, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let created_at = now.to_rfc3339_opts(SecondsFormat::Micros, true);
        let expires_at = Duration::try_hours(self.session_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Session lifetime of {}h is out of range",
                    self.session_ttl_hours
                ))
            })?
            .to_rfc3339_opts(SecondsFormat::Micros, true);

        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&created_at)
            .bind(&expires_at)
            .execute(&mut **tx)
            .await?;

        Ok(AuthSession {
            token,
            user_id: user_id.to_string(),
            email: email.to_string(),
            created_at,
            expires_at,
        })
    }
}
