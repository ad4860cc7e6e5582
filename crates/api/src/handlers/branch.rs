use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use mfc_core::{
    filter::{BranchServiceClause, BranchSort, Predicate},
    models::{
        branch::{Branch, BranchEnvelope, BranchRequest, BranchResponse},
        branch_service::BranchService,
        history::{AuditedEntity, HistoryEntry},
    },
    pagination::{Listing, PageQuery},
    presentation::{BranchExportRow, branch_response},
    rules,
    search::{BranchListQuery, ComplexSearchQuery, active_branches, branch_export},
};
use serde::Deserialize;

use super::export::{ExportQuery, export_response};
use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

fn represent(state: &ApiState, branch: Branch) -> BranchResponse {
    branch_response(branch, |handle| state.photos.url(handle))
}

fn envelope(state: &ApiState, message: String, branch: Branch, warnings: Vec<String>) -> BranchEnvelope {
    BranchEnvelope {
        message,
        branch: represent(state, branch),
        warnings,
    }
}

#[axum::debug_handler]
pub async fn list_branches(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BranchListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<BranchResponse>>, AppError> {
    let branches = state
        .store
        .list_branches(&query.predicate(), query.sort())
        .await?;
    listing(&state, branches, &page, |b| represent(&state, b))
}

#[axum::debug_handler]
pub async fn list_active_branches(
    State(state): State<Arc<ApiState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<BranchResponse>>, AppError> {
    let branches = state
        .store
        .list_branches(&active_branches(), BranchSort::default())
        .await?;
    listing(&state, branches, &page, |b| represent(&state, b))
}

#[axum::debug_handler]
pub async fn complex_search(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ComplexSearchQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<BranchResponse>>, AppError> {
    let branches = state
        .store
        .list_branches(&query.predicate(), BranchSort::default())
        .await?;
    listing(&state, branches, &page, |b| represent(&state, b))
}

/// Branches created in the last few days, as JSON or CSV.
#[axum::debug_handler]
pub async fn export_branches(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let branches = state
        .store
        .list_branches(&branch_export(Utc::now()), BranchSort::default())
        .await?;
    let rows: Vec<BranchExportRow> = branches.iter().map(BranchExportRow::from).collect();
    export_response(rows, query.format(), "branches")
}

#[axum::debug_handler]
pub async fn get_branch(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<BranchResponse>, AppError> {
    let branch = rules::get_branch(state.store.as_ref(), id).await?;
    Ok(Json(represent(&state, branch)))
}

#[axum::debug_handler]
pub async fn create_branch(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<BranchRequest>,
) -> Result<(StatusCode, Json<BranchEnvelope>), AppError> {
    let branch = rules::create_branch(state.store.as_ref(), &payload).await?;
    let message = format!("Branch \"{}\" created successfully", branch.name);
    Ok((
        StatusCode::CREATED,
        Json(envelope(&state, message, branch, Vec::new())),
    ))
}

#[axum::debug_handler]
pub async fn update_branch(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<BranchRequest>,
) -> Result<Json<BranchEnvelope>, AppError> {
    let branch = rules::update_branch(state.store.as_ref(), id, &payload).await?;
    let message = format!("Branch \"{}\" updated successfully", branch.name);
    Ok(Json(envelope(&state, message, branch, Vec::new())))
}

#[axum::debug_handler]
pub async fn toggle_active(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<BranchEnvelope>, AppError> {
    let branch = rules::toggle_branch_active(state.store.as_ref(), id).await?;
    let status = if branch.is_active { "active" } else { "inactive" };
    let message = format!("Branch status changed to {status}");
    Ok(Json(envelope(&state, message, branch, Vec::new())))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoQuery {
    pub filename: Option<String>,
}

/// Takes the raw file as the request body. An oversized file leaves the branch
/// untouched and comes back as a warning.
#[axum::debug_handler]
pub async fn upload_photo(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    Query(query): Query<PhotoQuery>,
    body: Bytes,
) -> Result<Json<BranchEnvelope>, AppError> {
    let file_name = query.filename.as_deref().unwrap_or("photo");
    let outcome = rules::attach_branch_photo(
        state.store.as_ref(),
        state.photos.as_ref(),
        id,
        file_name,
        &body,
    )
    .await?;

    let message = if outcome.warnings.is_empty() {
        format!("Photo of branch \"{}\" updated", outcome.branch.name)
    } else {
        format!("Photo of branch \"{}\" was not changed", outcome.branch.name)
    };
    Ok(Json(envelope(&state, message, outcome.branch, outcome.warnings)))
}

#[axum::debug_handler]
pub async fn clear_photo(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<BranchEnvelope>, AppError> {
    let branch =
        rules::clear_branch_photo(state.store.as_ref(), state.photos.as_ref(), id).await?;
    let message = format!("Photo of branch \"{}\" removed", branch.name);
    Ok(Json(envelope(&state, message, branch, Vec::new())))
}

#[axum::debug_handler]
pub async fn delete_branch(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<BranchEnvelope>, AppError> {
    let branch = rules::delete_branch(state.store.as_ref(), state.photos.as_ref(), id).await?;
    let message = format!("Branch \"{}\" deleted successfully", branch.name);
    Ok(Json(envelope(&state, message, branch, Vec::new())))
}

#[axum::debug_handler]
pub async fn branch_services(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<BranchService>>, AppError> {
    rules::get_branch(state.store.as_ref(), id).await?;
    let links = state
        .store
        .list_branch_services(&Predicate::clause(BranchServiceClause::Branch(id)))
        .await?;
    Ok(Json(links))
}

/// Change history, newest first. Still readable after the branch is deleted.
#[axum::debug_handler]
pub async fn branch_history(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let history = state.store.list_history(AuditedEntity::Branch, id).await?;
    Ok(Json(history))
}
