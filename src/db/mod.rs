//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for identities, profiles, tasks and applications.

mod identity;
mod repository;

pub use repository::*;

use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Current time as a fixed-width RFC 3339 string, so stored timestamps sort lexically.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ngo_profiles (
            id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            organization_name TEXT NOT NULL,
            contact_person TEXT NOT NULL,
            phone TEXT NOT NULL,
            city TEXT NOT NULL,
            description TEXT NOT NULL,
            cause_areas TEXT NOT NULL,
            website TEXT,
            logo TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS volunteer_profiles (
            id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            city TEXT NOT NULL,
            bio TEXT,
            skills TEXT NOT NULL,
            availability TEXT,
            profile_photo TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            ngo_id TEXT NOT NULL REFERENCES ngo_profiles(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            cause_area TEXT NOT NULL,
            required_skills TEXT NOT NULL,
            location TEXT NOT NULL,
            hours_per_week INTEGER NOT NULL CHECK (hours_per_week BETWEEN 1 AND 40),
            duration_months INTEGER NOT NULL CHECK (duration_months BETWEEN 1 AND 24),
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            volunteer_id TEXT NOT NULL REFERENCES volunteer_profiles(id) ON DELETE CASCADE,
            message TEXT,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'rejected')),
            applied_at TEXT NOT NULL,
            responded_at TEXT,
            UNIQUE (task_id, volunteer_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_ngo_id ON tasks(ngo_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_applications_task_id ON applications(task_id);
        CREATE INDEX IF NOT EXISTS idx_applications_volunteer_id ON applications(volunteer_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Fresh SQLite-backed repository in a throwaway directory.
#[cfg(test)]
pub(crate) async fn test_repository_with_ttl(
    session_ttl_hours: i64,
) -> (tempfile::TempDir, std::sync::Arc<dyn crate::backend::Backend>) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    let repo = Repository::new(pool).with_session_ttl_hours(session_ttl_hours);
    (dir, std::sync::Arc::new(repo))
}

#[cfg(test)]
pub(crate) async fn test_repository() -> (tempfile::TempDir, std::sync::Arc<dyn crate::backend::Backend>) {
    test_repository_with_ttl(24).await
}
