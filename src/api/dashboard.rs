//! Dashboard endpoint.

use axum::Extension;

use super::{success, ApiResult};
use crate::auth::SessionContext;
use crate::dashboard::{ngo_dashboard, volunteer_dashboard, Dashboard};
use crate::errors::AppError;
use crate::models::User;

/// GET /api/dashboard - Role-specific statistics.
pub async fn get_dashboard(Extension(ctx): Extension<SessionContext>) -> ApiResult<Dashboard> {
    let store = ctx.store.lock().await;

    let dashboard = match store.user() {
        Some(User::Ngo(_)) => Dashboard::Ngo(ngo_dashboard(store.tasks(), store.applications())),
        Some(User::Volunteer(volunteer)) => Dashboard::Volunteer(volunteer_dashboard(
            store.tasks(),
            store.applications(),
            volunteer,
        )),
        None => return Err(AppError::Unauthorized("Not signed in".to_string())),
    };
    success(dashboard)
}
