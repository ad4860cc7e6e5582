pub mod appointment;
pub mod branch;
pub mod branch_service;
pub mod employee;
pub mod export;
pub mod profile;
pub mod service;

use axum::Json;
use mfc_core::pagination::{Listing, PageQuery, paginate};

use crate::ApiState;
use crate::middleware::error_handling::AppError;

/// Paginates an ordered list with the configured page size and converts each
/// item to its API representation.
pub(crate) fn listing<T, U>(
    state: &ApiState,
    items: Vec<T>,
    page: &PageQuery,
    represent: impl FnMut(T) -> U,
) -> Result<Json<Listing<U>>, AppError> {
    let listing = paginate(items, state.page_size, page.number())?;
    Ok(Json(listing.map(represent)))
}
