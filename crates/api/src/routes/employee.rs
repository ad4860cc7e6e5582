use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers::employee};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/employees",
            get(employee::list_employees).post(employee::hire_employee),
        )
        .route(
            "/api/employees/:id",
            get(employee::get_employee)
                .put(employee::update_employee)
                .delete(employee::dismiss_employee),
        )
}
