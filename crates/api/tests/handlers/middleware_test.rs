use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use mfc_api::middleware::error_handling::{AppError, map_error};
use mfc_core::errors::{FieldErrors, MfcError};
use mfc_core::rules::TransitionPolicy;
use mfc_core::store::MockMfcStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::server_for;

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

#[tokio::test]
async fn test_error_handling_validation() {
    let mut errors = FieldErrors::new();
    errors.add("name", "Branch name is required");
    errors.add("email", "Email is required");

    let response = map_error(MfcError::Validation(errors));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "email": ["Email is required"],
            "name": ["Branch name is required"],
        })
    );
}

#[tokio::test]
async fn test_error_handling_not_found_hides_details() {
    let response = map_error(MfcError::not_found("Branch", "42"));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_error_handling_conflict() {
    let response = map_error(MfcError::Conflict("Branch is in use".to_string()));

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Branch is in use" })
    );
}

#[tokio::test]
async fn test_error_handling_database() {
    let response = map_error(MfcError::Database(eyre::eyre!("password authentication failed")));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "An unexpected error occurred" })
    );
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = MfcError::Internal(Box::new(std::io::Error::other("disk full")));

    let response = map_error(error);

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_eyre_reports_become_server_errors() {
    let error: AppError = eyre::eyre!("boom").into();
    assert!(matches!(error.0, MfcError::Database(_)));
}

#[tokio::test]
async fn test_store_failure_is_reported_generically() {
    let mut store = MockMfcStore::new();
    store
        .expect_list_services()
        .returning(|_, _| Err(MfcError::Database(eyre::eyre!("connection refused"))));
    let media = tempfile::tempdir().unwrap();
    let server = server_for(Arc::new(store), &media, None, TransitionPolicy::Permissive);

    let response = server.get("/api/services").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "An unexpected error occurred" }));
}

#[tokio::test]
async fn test_health_and_version() {
    let media = tempfile::tempdir().unwrap();
    let server = server_for(
        Arc::new(MockMfcStore::new()),
        &media,
        None,
        TransitionPolicy::Permissive,
    );

    server
        .get("/health")
        .await
        .assert_json(&json!({ "status": "ok" }));
    let version: Value = server.get("/version").await.json();
    assert_eq!(version["name"], "mfc-api");
}
