use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use mfc_core::{
    filter::ServiceSort,
    models::{
        history::{AuditedEntity, HistoryEntry},
        service::{ServiceEnvelope, ServiceRequest, ServiceResponse, UpdateDurationRequest},
    },
    pagination::{Listing, PageQuery},
    presentation::ServiceExportRow,
    rules,
    search::{FastServicesQuery, ServiceListQuery, service_export},
};

use super::export::{ExportQuery, export_response};
use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ServiceListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<ServiceResponse>>, AppError> {
    let services = state
        .store
        .list_services(&query.predicate(), query.sort())
        .await?;
    listing(&state, services, &page, ServiceResponse::from)
}

#[axum::debug_handler]
pub async fn fast_services(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<FastServicesQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<ServiceResponse>>, AppError> {
    let services = state
        .store
        .list_services(&query.predicate(), ServiceSort::default())
        .await?;
    listing(&state, services, &page, ServiceResponse::from)
}

/// Documents, transport and social services, grouped by category.
#[axum::debug_handler]
pub async fn export_services(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let (predicate, sort) = service_export();
    let services = state.store.list_services(&predicate, sort).await?;
    let rows: Vec<ServiceExportRow> = services.iter().map(ServiceExportRow::from).collect();
    export_response(rows, query.format(), "services")
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<ServiceResponse>, AppError> {
    let service = rules::get_service(state.store.as_ref(), id).await?;
    Ok(Json(service.into()))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<ServiceRequest>,
) -> Result<(StatusCode, Json<ServiceEnvelope>), AppError> {
    let service = rules::create_service(state.store.as_ref(), &payload).await?;
    let envelope = ServiceEnvelope {
        message: format!("Service \"{}\" created successfully", service.name),
        service: service.into(),
    };
    Ok((StatusCode::CREATED, Json(envelope)))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<ServiceRequest>,
) -> Result<Json<ServiceEnvelope>, AppError> {
    let service = rules::update_service(state.store.as_ref(), id, &payload).await?;
    Ok(Json(ServiceEnvelope {
        message: format!("Service \"{}\" updated successfully", service.name),
        service: service.into(),
    }))
}

#[axum::debug_handler]
pub async fn update_duration(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<UpdateDurationRequest>,
) -> Result<Json<ServiceEnvelope>, AppError> {
    let service =
        rules::update_service_duration(state.store.as_ref(), id, payload.duration_days.as_ref())
            .await?;
    Ok(Json(ServiceEnvelope {
        message: format!(
            "Service duration changed to {} days",
            service.duration_days
        ),
        service: service.into(),
    }))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<ServiceEnvelope>, AppError> {
    let service = rules::delete_service(state.store.as_ref(), id).await?;
    Ok(Json(ServiceEnvelope {
        message: format!("Service \"{}\" deleted successfully", service.name),
        service: service.into(),
    }))
}

#[axum::debug_handler]
pub async fn service_history(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state.store.list_history(AuditedEntity::Service, id).await?;
    Ok(Json(history))
}
