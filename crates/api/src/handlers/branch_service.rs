use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use mfc_core::{
    models::branch_service::{BranchService, LinkServiceRequest, SetAvailabilityRequest},
    pagination::{Listing, PageQuery},
    rules,
    search::BranchServiceListQuery,
};

use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_branch_services(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BranchServiceListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<BranchService>>, AppError> {
    let links = state.store.list_branch_services(&query.predicate()).await?;
    listing(&state, links, &page, |link| link)
}

#[axum::debug_handler]
pub async fn link_service(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<LinkServiceRequest>,
) -> Result<(StatusCode, Json<BranchService>), AppError> {
    let link = rules::link_service(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<SetAvailabilityRequest>,
) -> Result<Json<BranchService>, AppError> {
    let link =
        rules::set_service_availability(state.store.as_ref(), id, payload.is_available).await?;
    Ok(Json(link))
}

#[axum::debug_handler]
pub async fn unlink_service(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    rules::unlink_service(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
