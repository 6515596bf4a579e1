//! CommunityConnect Backend
//!
//! REST backend for a marketplace where NGOs publish volunteer tasks and
//! volunteers apply to them. SQLite persistence, one cached store per session.

mod api;
mod auth;
mod backend;
mod config;
mod dashboard;
mod db;
mod errors;
mod filters;
mod models;
mod store;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backend::Backend;
use config::Config;
use db::Repository;
use store::SessionRegistry;

const SESSION_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting CommunityConnect Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Session lifetime: {}h", config.session_ttl_hours);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let backend: Arc<dyn Backend> =
        Arc::new(Repository::new(pool).with_session_ttl_hours(config.session_ttl_hours));

    // Create application state
    let state = AppState {
        sessions: Arc::new(SessionRegistry::new(backend)),
    };

    // Reclaim stores of sessions that expired without a logout
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.sweep_expired().await;
        }
    });

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Open routes
    let public_routes = Router::new()
        .route("/vocabulary", get(api::get_vocabulary))
        .route("/auth/register/ngo", post(api::register_ngo))
        .route("/auth/register/volunteer", post(api::register_volunteer))
        .route("/auth/login", post(api::login));

    // Routes that need a live session
    let session_routes = Router::new()
        .route("/auth/logout", post(api::logout))
        .route("/auth/session", get(api::current_session))
        .route("/refresh", post(api::refresh))
        // Tasks
        .route("/tasks", get(api::list_tasks).post(api::create_task))
        .route("/tasks/mine", get(api::my_tasks))
        .route("/tasks/recommended", get(api::recommended_tasks))
        .route("/tasks/{id}", put(api::update_task).delete(api::delete_task))
        .route("/tasks/{id}/apply", post(api::apply_to_task))
        // Applications
        .route("/applications", get(api::list_applications))
        .route(
            "/applications/{id}/status",
            put(api::update_application_status),
        )
        // Dashboard
        .route("/dashboard", get(api::get_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_auth_layer,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.merge(session_routes))
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
