//! # MFC API
//!
//! The web server for the multi-function center administration service. It
//! exposes REST endpoints for branches, services, their availability links,
//! user profiles, employees and appointments.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: request parsing and response shaping; all writes go through
//!   `mfc_core::rules`
//! - **Extract**: body and path extractors that reject with the error mapping
//! - **Middleware**: error mapping
//! - **Storage**: photo files on local disk
//! - **Config**: environment and application configuration
//!
//! Handlers only see the [`MfcStore`] and [`PhotoStorage`] seams, so the same
//! router runs against PostgreSQL in production and the in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request extractors with JSON error bodies
pub mod extract;
/// Request handlers
pub mod handlers;
/// Error mapping shared by all handlers
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Local photo file storage
pub mod storage;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method, StatusCode, header},
};
use eyre::Result;
use mfc_core::rules::TransitionPolicy;
use mfc_core::storage::PhotoStorage;
use mfc_core::store::MfcStore;
use mfc_db::PgStore;
use serde_json::{Value, json};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::storage::LocalPhotoStorage;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use mfc_api::ApiState;
/// use mfc_core::rules::TransitionPolicy;
/// use mfc_core::storage::MemoryPhotoStorage;
/// use mfc_core::store::MemoryStore;
///
/// let state = Arc::new(ApiState {
///     store: Arc::new(MemoryStore::new()),
///     photos: Arc::new(MemoryPhotoStorage::new()),
///     page_size: None,
///     transitions: TransitionPolicy::Permissive,
/// });
/// ```
pub struct ApiState {
    /// Persistence for every entity
    pub store: Arc<dyn MfcStore>,
    /// Where branch photos are kept
    pub photos: Arc<dyn PhotoStorage>,
    /// List page size; `None` returns full lists
    pub page_size: Option<u32>,
    pub transitions: TransitionPolicy,
}

/// Builds the application router with every route, serving photo files from
/// `media_root` under `media_mount`.
pub fn build_router(state: Arc<ApiState>, media_root: &Path, media_mount: &str) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Branch offices, their photos and exports
        .merge(routes::branch::routes())
        // Service catalog
        .merge(routes::service::routes())
        // Service availability per branch
        .merge(routes::branch_service::routes())
        // People: profiles and employees
        .merge(routes::profile::routes())
        .merge(routes::employee::routes())
        .merge(routes::appointment::routes())
        // Attach shared state to all routes
        .with_state(state)
        .nest_service(media_mount, ServeDir::new(media_root))
        .layer(TraceLayer::new_for_http())
}

async fn handle_timeout(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": middleware::error_handling::UNEXPECTED_MESSAGE })),
        )
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Starts the API server on top of PostgreSQL.
///
/// Installs the log subscriber, wires the store, photo storage and routes, then
/// serves until the process is stopped.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tokio::fs::create_dir_all(&config.media_root).await?;

    let state = Arc::new(ApiState {
        store: Arc::new(PgStore::new(db_pool)),
        photos: Arc::new(LocalPhotoStorage::new(
            config.media_root.clone(),
            config.media_url.clone(),
        )),
        page_size: config.page_size,
        transitions: config.transition_policy(),
    });

    let app = build_router(state, &config.media_root, config.media_mount());

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    // Add request timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .timeout(Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        page_size = ?config.page_size,
        transitions = ?config.transition_policy(),
        "Server listening on http://{}",
        addr
    );
    axum::serve(listener, app).await?;

    Ok(())
}
