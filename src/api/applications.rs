//! Application API endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use super::{success, ApiResult};
use crate::auth::SessionContext;
use crate::dashboard::filter_applications;
use crate::errors::AppError;
use crate::models::{Application, ApplicationQuery, UpdateApplicationStatusRequest};

/// GET /api/applications - The caller's applications, optionally filtered.
pub async fn list_applications(
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<ApplicationQuery>,
) -> ApiResult<Vec<Application>> {
    let store = ctx.store.lock().await;
    success(
        filter_applications(store.applications(), &query)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// PUT /api/applications/{id}/status - Accept or reject.
pub async fn update_application_status(
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(request): Json<UpdateApplicationStatusRequest>,
) -> ApiResult<Application> {
    let mut store = ctx.store.lock().await;
    store.update_application_status(&id, request.status).await?;

    let application = store
        .applications()
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;
    success(application)
}
