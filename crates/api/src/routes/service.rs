use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::service};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/services",
            get(service::list_services).post(service::create_service),
        )
        .route("/api/services/fast_services", get(service::fast_services))
        .route("/api/services/export", get(service::export_services))
        .route(
            "/api/services/:id",
            get(service::get_service)
                .put(service::update_service)
                .delete(service::delete_service),
        )
        .route(
            "/api/services/:id/update_duration",
            post(service::update_duration),
        )
        .route("/api/services/:id/history", get(service::service_history))
}
