use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use mfc_core::{
    models::{
        appointment::{Appointment, AppointmentRequest, ChangeStatusRequest},
        history::{AuditedEntity, HistoryEntry},
    },
    pagination::{Listing, PageQuery},
    rules,
    search::AppointmentListQuery,
};

use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<AppointmentListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<Appointment>>, AppError> {
    let appointments = state.store.list_appointments(&query.predicate()).await?;
    listing(&state, appointments, &page, |appointment| appointment)
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Appointment>, AppError> {
    Ok(Json(rules::get_appointment(state.store.as_ref(), id).await?))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<AppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = rules::book_appointment(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<AppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment =
        rules::update_appointment(state.store.as_ref(), state.transitions, id, &payload).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<ChangeStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = rules::change_appointment_status(
        state.store.as_ref(),
        state.transitions,
        id,
        &payload.status,
    )
    .await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    rules::delete_appointment(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn appointment_history(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state
        .store
        .list_history(AuditedEntity::Appointment, id)
        .await?;
    Ok(Json(history))
}
