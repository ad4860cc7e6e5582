use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::appointment};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(appointment::list_appointments).post(appointment::book_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(appointment::get_appointment)
                .put(appointment::update_appointment)
                .delete(appointment::delete_appointment),
        )
        .route("/api/appointments/:id/status", post(appointment::change_status))
        .route(
            "/api/appointments/:id/history",
            get(appointment::appointment_history),
        )
}
