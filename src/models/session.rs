//! Authentication session records.

use serde::{Deserialize, Serialize};

use super::User;

/// A live backend session for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub created_at: String,
    pub expires_at: String,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        chrono::DateTime::parse_from_rfc3339(&self.expires_at)
            .map(|expires| expires <= chrono::Utc::now())
            .unwrap_or(true)
    }
}

/// Response body for register, login and session restore.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub token: String,
    pub email: String,
    pub expires_at: String,
    pub user: User,
}
