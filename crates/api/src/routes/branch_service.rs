use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers::branch_service};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/branch-services",
            get(branch_service::list_branch_services).post(branch_service::link_service),
        )
        .route(
            "/api/branch-services/:id",
            put(branch_service::set_availability).delete(branch_service::unlink_service),
        )
}
