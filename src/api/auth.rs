//! Registration, login and session endpoints.

use axum::{extract::State, Extension, Json};

use super::{success, ApiResult};
use crate::auth::SessionContext;
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterNgoRequest, RegisterVolunteerRequest, SessionPayload};
use crate::store::Store;
use crate::validation::{validate_ngo_registration, validate_volunteer_registration};
use crate::AppState;

fn session_payload(store: &Store) -> Result<SessionPayload, AppError> {
    match (store.session(), store.user()) {
        (Some(session), Some(user)) => Ok(SessionPayload {
            token: session.token.clone(),
            email: session.email.clone(),
            expires_at: session.expires_at.clone(),
            user: user.clone(),
        }),
        _ => Err(AppError::Unauthorized("Not signed in".to_string())),
    }
}

/// Answer with the new session and keep its store live.
async fn open(state: &AppState, store: Store) -> ApiResult<SessionPayload> {
    let payload = session_payload(&store)?;
    state.sessions.insert(store).await?;
    success(payload)
}

/// POST /api/auth/register/ngo - Create an NGO account and sign in.
pub async fn register_ngo(
    State(state): State<AppState>,
    Json(request): Json<RegisterNgoRequest>,
) -> ApiResult<SessionPayload> {
    let registration = validate_ngo_registration(request)?;

    let mut store = state.sessions.new_store();
    store.register_ngo(registration).await?;
    open(&state, store).await
}

/// POST /api/auth/register/volunteer - Create a volunteer account and sign in.
pub async fn register_volunteer(
    State(state): State<AppState>,
    Json(request): Json<RegisterVolunteerRequest>,
) -> ApiResult<SessionPayload> {
    let registration = validate_volunteer_registration(request)?;

    let mut store = state.sessions.new_store();
    store.register_volunteer(registration).await?;
    open(&state, store).await
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionPayload> {
    let mut store = state.sessions.new_store();
    store
        .login(&request.email, &request.password, request.role)
        .await?;
    open(&state, store).await
}

/// POST /api/auth/logout - End the session and drop its store.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult<()> {
    ctx.store.lock().await.logout().await;
    state.sessions.remove(&ctx.token).await;
    tracing::debug!("Session closed; {} still live", state.sessions.len().await);
    success(())
}

/// GET /api/auth/session - The signed-in user.
pub async fn current_session(
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult<SessionPayload> {
    let store = ctx.store.lock().await;
    success(session_payload(&store)?)
}

/// POST /api/refresh - Re-fetch the caller's task and application caches.
pub async fn refresh(Extension(ctx): Extension<SessionContext>) -> ApiResult<()> {
    let mut store = ctx.store.lock().await;
    store.refresh_tasks().await?;
    store.refresh_applications().await?;
    success(())
}
