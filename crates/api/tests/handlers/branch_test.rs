use axum::http::StatusCode;
use axum::body::Bytes;
use mfc_core::rules::{PHOTO_TOO_LARGE, TransitionPolicy};
use mfc_core::storage::MAX_PHOTO_BYTES;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, branch_payload, id_of};

#[tokio::test]
async fn test_create_branch_returns_envelope() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/branches")
        .json(&branch_payload("  Central  ", "central@mfc.ru"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Branch \"Central\" created successfully");
    assert_eq!(body["branch"]["name"], "Central");
    assert_eq!(body["branch"]["is_active"], true);
    assert_eq!(body["branch"]["phone_display"], "+7 (916) 123-45-67");
    assert_eq!(body["branch"]["photo_url"], Value::Null);
    assert!(body.get("warnings").is_none());
}

#[tokio::test]
async fn test_create_branch_reports_every_invalid_field() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/branches")
        .json(&json!({
            "name": "AB",
            "address": "short",
            "phone": "12345",
            "email": "not-an-email",
            "work_schedule": "",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    for field in ["name", "address", "phone", "email", "work_schedule"] {
        assert!(body[field].is_array(), "missing error for {field}");
    }
    assert_eq!(
        body["email"][0],
        "Enter a valid email address (e.g. office@mfc.ru)"
    );
}

#[tokio::test]
async fn test_duplicate_email_is_a_field_error() {
    let ctx = TestContext::new();
    ctx.create_branch("Central", "office@mfc.ru").await;

    let response = ctx
        .server
        .post("/api/branches")
        .json(&branch_payload("North", "office@mfc.ru"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "email": ["A branch with this email already exists"]
    }));
}

#[tokio::test]
async fn test_unknown_branch_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/branches/7f0c2f4e-4b3e-4c55-9d7a-2b8c1c7f1e11")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_malformed_identifier_is_not_found() {
    let ctx = TestContext::new();

    for path in ["/api/branches/42", "/api/branches/42/history"] {
        let response = ctx.server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "error": "Not found" }));
    }

    let response = ctx
        .server
        .put("/api/branches/not-a-uuid")
        .json(&branch_payload("Central", "central@mfc.ru"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_paginated_by_name() {
    let ctx = TestContext::with_options(Some(2), TransitionPolicy::Permissive);
    for (name, email) in [
        ("Zeta office", "zeta@mfc.ru"),
        ("Alpha office", "alpha@mfc.ru"),
        ("Central", "central@mfc.ru"),
    ] {
        ctx.create_branch(name, email).await;
    }

    let first: Value = ctx.server.get("/api/branches").await.json();
    assert_eq!(first["count"], 3);
    assert_eq!(first["next"], 2);
    assert_eq!(first["previous"], Value::Null);
    assert_eq!(first["results"][0]["name"], "Alpha office");
    assert_eq!(first["results"][1]["name"], "Central");

    let second: Value = ctx
        .server
        .get("/api/branches")
        .add_query_param("page", "2")
        .await
        .json();
    assert_eq!(second["results"][0]["name"], "Zeta office");
    assert_eq!(second["previous"], 1);

    let garbage: Value = ctx
        .server
        .get("/api/branches")
        .add_query_param("page", "abc")
        .await
        .json();
    assert_eq!(garbage["results"], first["results"]);

    ctx.server
        .get("/api/branches")
        .add_query_param("page", "9")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_orders() {
    let ctx = TestContext::new();
    let north = ctx.create_branch("North", "north@mfc.ru").await;
    ctx.create_branch("South", "south@mfc.ru").await;
    ctx.server
        .post(&format!("/api/branches/{}/toggle_active", id_of(&north)))
        .await
        .assert_status_ok();

    let inactive: Value = ctx
        .server
        .get("/api/branches")
        .add_query_param("is_active", "false")
        .await
        .json();
    assert_eq!(inactive.as_array().map(Vec::len), Some(1));
    assert_eq!(inactive[0]["name"], "North");

    let descending: Value = ctx
        .server
        .get("/api/branches")
        .add_query_param("ordering", "-name")
        .await
        .json();
    assert_eq!(descending[0]["name"], "South");

    let active: Value = ctx.server.get("/api/branches/active").await.json();
    assert_eq!(active.as_array().map(Vec::len), Some(1));
    assert_eq!(active[0]["name"], "South");
}

#[tokio::test]
async fn test_complex_search_hides_test_emails() {
    let ctx = TestContext::new();
    ctx.create_branch("Central office", "central@mfc.ru").await;
    ctx.create_branch("Office for testing", "qa-test@mfc.ru").await;
    ctx.create_branch("River side", "river@mfc.ru").await;

    let found: Value = ctx
        .server
        .get("/api/branches/complex_search")
        .add_query_param("query", "OFFICE")
        .await
        .json();
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Central office"]);

    let everything: Value = ctx.server.get("/api/branches/complex_search").await.json();
    assert_eq!(everything.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_toggle_active_flips_and_reports() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let path = format!("/api/branches/{}/toggle_active", id_of(&branch));

    let body: Value = ctx.server.post(&path).await.json();
    assert_eq!(body["message"], "Branch status changed to inactive");
    assert_eq!(body["branch"]["is_active"], false);

    let body: Value = ctx.server.post(&path).await.json();
    assert_eq!(body["message"], "Branch status changed to active");
}

#[tokio::test]
async fn test_update_keeps_activity_when_omitted() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let id = id_of(&branch);
    ctx.server
        .post(&format!("/api/branches/{id}/toggle_active"))
        .await
        .assert_status_ok();

    let body: Value = ctx
        .server
        .put(&format!("/api/branches/{id}"))
        .json(&branch_payload("Central renamed", "central@mfc.ru"))
        .await
        .json();

    assert_eq!(body["branch"]["name"], "Central renamed");
    assert_eq!(body["branch"]["is_active"], false);
}

#[tokio::test]
async fn test_photo_upload_is_served_and_replaced() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let path = format!("/api/branches/{}/photo", id_of(&branch));

    let first: Value = ctx
        .server
        .put(&path)
        .add_query_param("filename", "front door.jpg")
        .bytes(Bytes::from_static(b"first photo"))
        .await
        .json();
    let first_url = first["branch"]["photo_url"].as_str().unwrap().to_string();
    assert!(first_url.starts_with("/media/branches/"));
    assert!(first_url.ends_with("_frontdoor.jpg"));

    let served = ctx.server.get(&first_url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), b"first photo");

    let second: Value = ctx
        .server
        .put(&path)
        .add_query_param("filename", "new.png")
        .bytes(Bytes::from_static(b"second photo"))
        .await
        .json();
    assert_ne!(second["branch"]["photo_url"], first["branch"]["photo_url"]);

    let old_file = ctx
        .media
        .path()
        .join(first["branch"]["photo"].as_str().unwrap());
    assert!(!old_file.exists());

    let cleared: Value = ctx.server.delete(&path).await.json();
    assert_eq!(cleared["branch"]["photo_url"], Value::Null);
}

#[tokio::test]
async fn test_oversized_photo_is_a_warning() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;

    let response = ctx
        .server
        .put(&format!("/api/branches/{}/photo", id_of(&branch)))
        .add_query_param("filename", "huge.jpg")
        .bytes(Bytes::from(vec![0u8; MAX_PHOTO_BYTES + 1]))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["warnings"], json!([PHOTO_TOO_LARGE]));
    assert_eq!(body["branch"]["photo"], Value::Null);
}

#[tokio::test]
async fn test_branch_with_employees_cannot_be_deleted() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let profile = ctx.create_profile("ivanov").await;
    ctx.server
        .post("/api/employees")
        .json(&json!({
            "user_profile_id": id_of(&profile),
            "office_id": id_of(&branch),
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let path = format!("/api/branches/{}", id_of(&branch));
    let response = ctx.server.delete(&path).await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({
        "error": "Cannot delete the branch because employees are assigned to it"
    }));
    ctx.server.get(&path).await.assert_status_ok();
}

#[tokio::test]
async fn test_delete_branch_keeps_history() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let id = id_of(&branch);

    let body: Value = ctx.server.delete(&format!("/api/branches/{id}")).await.json();
    assert_eq!(body["message"], "Branch \"Central\" deleted successfully");

    ctx.server
        .get(&format!("/api/branches/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let history: Value = ctx
        .server
        .get(&format!("/api/branches/{id}/history"))
        .await
        .json();
    let actions: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["deleted", "created"]);
}

#[tokio::test]
async fn test_branch_services_lists_links() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;

    ctx.server
        .post("/api/branch-services")
        .json(&json!({
            "branch_id": id_of(&branch),
            "service_id": id_of(&service),
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let links: Value = ctx
        .server
        .get(&format!("/api/branches/{}/services", id_of(&branch)))
        .await
        .json();
    assert_eq!(links[0]["service_name"], "Birth certificate");
    assert_eq!(links[0]["is_available"], true);
}

#[tokio::test]
async fn test_export_as_csv() {
    let ctx = TestContext::new();
    ctx.create_branch("Central", "central@mfc.ru").await;

    let response = ctx
        .server
        .get("/api/branches/export")
        .add_query_param("format", "csv")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    let text = response.text();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("id,name,address,phone,email,work_schedule,is_active,created_at,updated_at")
    );
    let row = lines.next().unwrap();
    assert!(row.contains("Central,\"Central, Tversk...\",+7 (916) 123-45-67"));
    assert!(row.contains(",Active,"));
}

#[tokio::test]
async fn test_export_defaults_to_json() {
    let ctx = TestContext::new();
    ctx.create_branch("Central", "central@mfc.ru").await;

    let rows: Value = ctx.server.get("/api/branches/export").await.json();
    assert_eq!(rows[0]["address"], "Central, Tversk...");
    assert_eq!(rows[0]["is_active"], "Active");
}
