use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use mfc_core::{
    models::profile::{ProfileRequest, UserProfile},
    pagination::{Listing, PageQuery},
    rules,
    search::ProfileListQuery,
};

use super::listing;
use crate::{
    ApiState,
    extract::{IdPath, ValidJson},
    middleware::error_handling::AppError,
};

#[axum::debug_handler]
pub async fn list_profiles(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ProfileListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Listing<UserProfile>>, AppError> {
    let profiles = state.store.list_profiles(&query.predicate()).await?;
    listing(&state, profiles, &page, |profile| profile)
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(rules::get_profile(state.store.as_ref(), id).await?))
}

#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<Arc<ApiState>>,
    ValidJson(payload): ValidJson<ProfileRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let profile = rules::create_profile(state.store.as_ref(), &payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
    ValidJson(payload): ValidJson<ProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(
        rules::update_profile(state.store.as_ref(), id, &payload).await?,
    ))
}

/// Also removes the profile's employee record and appointments.
#[axum::debug_handler]
pub async fn delete_profile(
    State(state): State<Arc<ApiState>>,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    rules::delete_profile(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
