use std::error::Error;

use mfc_core::errors::{FieldErrors, MfcError, MfcResult, NON_FIELD_ERRORS};
use pretty_assertions::assert_eq;

#[test]
fn test_mfc_error_display() {
    let not_found = MfcError::not_found("Branch", 7);
    let validation = MfcError::validation("email", "Enter a valid email address");
    let conflict = MfcError::Conflict("Branch has employees".to_string());
    let database = MfcError::Database(eyre::eyre!("Database connection failed"));
    let internal = MfcError::Internal(Box::new(std::io::Error::other("Internal error")));

    assert_eq!(
        not_found.to_string(),
        "Resource not found: Branch with ID 7 not found"
    );
    assert_eq!(
        validation.to_string(),
        "Validation error: email: Enter a valid email address"
    );
    assert_eq!(conflict.to_string(), "Conflict: Branch has employees");
    assert!(database.to_string().contains("Database error:"));
    assert!(internal.to_string().contains("Internal server error:"));
}

#[test]
fn test_internal_error_keeps_source() {
    let time_error = MfcError::Internal(Box::new(std::io::Error::other("IO error")));

    assert!(time_error.source().is_some());
}

#[test]
fn test_field_errors_collect_per_field() {
    let mut errors = FieldErrors::new();
    errors.add("name", "Name is required");
    errors.add("name", "Name must be at least 3 characters");
    errors.add(NON_FIELD_ERRORS, "Pair already exists");

    assert_eq!(errors.get("name").map(<[String]>::len), Some(2));
    assert!(errors.contains(NON_FIELD_ERRORS));
    assert!(!errors.contains("email"));

    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "name": ["Name is required", "Name must be at least 3 characters"],
            "non_field_errors": ["Pair already exists"],
        })
    );
}

#[test]
fn test_empty_field_errors_are_ok() {
    let result: MfcResult<()> = FieldErrors::new().into_result();
    assert!(result.is_ok());

    let result = FieldErrors::single("phone", "Phone is required").into_result();
    assert!(matches!(result, Err(MfcError::Validation(_))));
}
