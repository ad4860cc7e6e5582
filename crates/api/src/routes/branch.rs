use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::{ApiState, handlers::branch};

/// Uploads above the photo limit must still reach the handler so it can answer
/// with a warning instead of a bare 413.
const PHOTO_BODY_LIMIT: usize = 25 * 1024 * 1024;

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/branches",
            get(branch::list_branches).post(branch::create_branch),
        )
        .route("/api/branches/active", get(branch::list_active_branches))
        .route("/api/branches/complex_search", get(branch::complex_search))
        .route("/api/branches/export", get(branch::export_branches))
        .route(
            "/api/branches/:id",
            get(branch::get_branch)
                .put(branch::update_branch)
                .delete(branch::delete_branch),
        )
        .route("/api/branches/:id/toggle_active", post(branch::toggle_active))
        .route(
            "/api/branches/:id/photo",
            put(branch::upload_photo)
                .delete(branch::clear_photo)
                .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
        .route("/api/branches/:id/services", get(branch::branch_services))
        .route("/api/branches/:id/history", get(branch::branch_history))
}
