use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers::profile};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/profiles",
            get(profile::list_profiles).post(profile::create_profile),
        )
        .route(
            "/api/profiles/:id",
            get(profile::get_profile)
                .put(profile::update_profile)
                .delete(profile::delete_profile),
        )
}
