use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use mfc_core::{
    models::employee::{Employee, EmployeeRequest},
    pagination::{Listing, PageQuery},
    rules,
    search::EmployeeListQuery,
};

use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_employees(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EmployeeListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<Employee>>, AppError> {
    let employees = state.store.list_employees(&query.predicate()).await?;
    listing(&state, employees, &page, |employee| employee)
}

#[axum::debug_handler]
pub async fn get_employee(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(rules::get_employee(state.store.as_ref(), id).await?))
}

/// Hiring promotes the linked profile to the employee role.
#[axum::debug_handler]
pub async fn hire_employee(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<EmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let employee = rules::hire_employee(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

#[axum::debug_handler]
pub async fn update_employee(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<EmployeeRequest>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(
        rules::update_employee(state.store.as_ref(), id, &payload).await?,
    ))
}

#[axum::debug_handler]
pub async fn dismiss_employee(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    rules::dismiss_employee(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
