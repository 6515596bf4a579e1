//! Task API endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};

use super::{success, ApiResult};
use crate::auth::SessionContext;
use crate::dashboard::task_overviews;
use crate::errors::AppError;
use crate::filters::{filter_tasks, recommend_tasks, TaskFilter, TaskQuery};
use crate::models::{
    ApplyRequest, Application, CreateTaskRequest, Task, TaskOverview, UpdateTaskRequest,
};
use crate::validation::{validate_task, validate_task_update};

/// GET /api/tasks - Browse active tasks.
pub async fn list_tasks(
    Extension(ctx): Extension<SessionContext>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Vec<Task>> {
    let filter = TaskFilter::try_from(query)?;

    let store = ctx.store.lock().await;
    success(filter_tasks(store.tasks(), &filter).into_iter().cloned().collect())
}

/// GET /api/tasks/mine - The NGO's tasks with application counts.
pub async fn my_tasks(Extension(ctx): Extension<SessionContext>) -> ApiResult<Vec<TaskOverview>> {
    let store = ctx.store.lock().await;
    if store.user().and_then(|u| u.as_ngo()).is_none() {
        return Err(AppError::Forbidden("Only NGOs have a task list".to_string()));
    }
    success(task_overviews(store.tasks(), store.applications()))
}

/// GET /api/tasks/recommended - Tasks suggested for the volunteer.
pub async fn recommended_tasks(
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult<Vec<Task>> {
    let store = ctx.store.lock().await;
    let volunteer = store
        .user()
        .and_then(|u| u.as_volunteer())
        .ok_or_else(|| AppError::Forbidden("Only volunteers get recommendations".to_string()))?;

    let applied = store.applied_task_ids();
    success(
        recommend_tasks(store.tasks(), volunteer, &applied)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// POST /api/tasks - Publish a new task.
pub async fn create_task(
    Extension(ctx): Extension<SessionContext>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    let draft = validate_task(request)?;

    let mut store = ctx.store.lock().await;
    let id = store.create_task(draft).await?;
    success(cached_task(store.tasks(), &id)?)
}

/// PUT /api/tasks/{id} - Edit a task or toggle its status.
pub async fn update_task(
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Task> {
    let changes = validate_task_update(request)?;

    let mut store = ctx.store.lock().await;
    store.update_task(&id, changes).await?;
    success(cached_task(store.tasks(), &id)?)
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ctx.store.lock().await.delete_task(&id).await?;
    success(())
}

/// POST /api/tasks/{id}/apply
pub async fn apply_to_task(
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Application> {
    let mut store = ctx.store.lock().await;

    if store.applied_task_ids().contains(&id) {
        return Err(AppError::Conflict(
            "You have already applied to this task".to_string(),
        ));
    }

    let message = request
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let app_id = store.apply_to_task(&id, message).await?;

    store
        .applications()
        .iter()
        .find(|a| a.id == app_id)
        .cloned()
        .map(super::ApiResponse::new)
        .ok_or_else(|| AppError::Internal(format!("Application {} missing after insert", app_id)))
}

fn cached_task(tasks: &[Task], id: &str) -> Result<Task, AppError> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| AppError::Internal(format!("Task {} missing after write", id)))
}
