use axum::body::Bytes;
use axum::http::StatusCode;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

use crate::test_utils::{TestContext, id_of};

fn names(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .expect("unpaginated listing")
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_service_applies_defaults() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/services")
        .json(&json!({ "name": "Pension consultation" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Service \"Pension consultation\" created successfully"
    );
    assert_eq!(body["service"]["category"], "OTHER");
    assert_eq!(body["service"]["category_display"], "Other");
    assert_eq!(body["service"]["duration_days"], 14);
}

#[tokio::test]
async fn test_unknown_category_is_rejected() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/services")
        .json(&json!({ "name": "Fishing permit", "category": "FISH" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["category"].is_array());
}

#[rstest]
#[case(json!({}), "New duration is not specified")]
#[case(json!({ "duration_days": "" }), "New duration is not specified")]
#[case(json!({ "duration_days": "abc" }), "Duration must be a number")]
#[case(json!({ "duration_days": 0 }), "New duration is not specified")]
#[case(json!({ "duration_days": "0" }), "Duration must be between 1 and 365 days")]
#[case(json!({ "duration_days": "400" }), "Duration must be between 1 and 365 days")]
#[tokio::test]
async fn test_update_duration_rejects(#[case] payload: Value, #[case] message: &str) {
    let ctx = TestContext::new();
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;

    let response = ctx
        .server
        .post(&format!("/api/services/{}/update_duration", id_of(&service)))
        .json(&payload)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "duration_days": [message] }));
}

#[tokio::test]
async fn test_update_duration_accepts_numeric_strings() {
    let ctx = TestContext::new();
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;
    let id = id_of(&service);

    let body: Value = ctx
        .server
        .post(&format!("/api/services/{id}/update_duration"))
        .json(&json!({ "duration_days": " 10 " }))
        .await
        .json();
    assert_eq!(body["message"], "Service duration changed to 10 days");
    assert_eq!(body["service"]["duration_days"], 10);
    assert_eq!(body["service"]["name"], "Birth certificate");

    let history: Value = ctx
        .server
        .get(&format!("/api/services/{id}/history"))
        .await
        .json();
    assert_eq!(history[0]["action"], "updated");
    assert_eq!(history[0]["snapshot"]["duration_days"], 10);
}

#[tokio::test]
async fn test_fast_services() {
    let ctx = TestContext::new();
    ctx.create_service("International passport", "DOC", 30).await;
    ctx.create_service("Vehicle registration", "TRANS", 10).await;
    ctx.create_service("Quick housing note", "PROP", 2).await;
    ctx.create_service("Land survey", "PROP", 20).await;
    ctx.create_service("Temporary registration", "DOC", 1).await;

    let fast: Value = ctx.server.get("/api/services/fast_services").await.json();
    assert_eq!(
        names(&fast),
        vec![
            "International passport",
            "Quick housing note",
            "Vehicle registration"
        ]
    );

    let capped: Value = ctx
        .server
        .get("/api/services/fast_services")
        .add_query_param("max_days", "10")
        .await
        .json();
    assert_eq!(
        names(&capped),
        vec!["Quick housing note", "Vehicle registration"]
    );

    let ignored: Value = ctx
        .server
        .get("/api/services/fast_services")
        .add_query_param("max_days", "abc")
        .await
        .json();
    assert_eq!(names(&ignored), names(&fast));
}

#[tokio::test]
async fn test_list_filters_by_category_and_search() {
    let ctx = TestContext::new();
    ctx.create_service("International passport", "DOC", 30).await;
    ctx.create_service("Passport replacement", "DOC", 10).await;
    ctx.create_service("Vehicle registration", "TRANS", 10).await;

    let docs: Value = ctx
        .server
        .get("/api/services")
        .add_query_param("category", "DOC")
        .add_query_param("ordering", "-duration_days")
        .await
        .json();
    assert_eq!(
        names(&docs),
        vec!["International passport", "Passport replacement"]
    );

    let searched: Value = ctx
        .server
        .get("/api/services")
        .add_query_param("search", "REGISTR")
        .await
        .json();
    assert_eq!(names(&searched), vec!["Vehicle registration"]);
}

#[tokio::test]
async fn test_export_covers_three_categories() {
    let ctx = TestContext::new();
    ctx.create_service("Vehicle registration", "TRANS", 10).await;
    ctx.create_service("Child benefit", "SOC", 5).await;
    ctx.create_service("Birth certificate", "DOC", 3).await;
    ctx.create_service("Land survey", "PROP", 20).await;

    let rows: Value = ctx.server.get("/api/services/export").await.json();
    let exported: Vec<(&str, &str, &str)> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["name"].as_str().unwrap(),
                row["category"].as_str().unwrap(),
                row["duration_assessment"].as_str().unwrap(),
            )
        })
        .collect();

    assert_eq!(
        exported,
        vec![
            ("Birth certificate", "Documents", "Fast (≤ 3 days)"),
            ("Child benefit", "Social services", "Medium (4-7 days)"),
            ("Vehicle registration", "Transport", "Slow (> 7 days)"),
        ]
    );
}

#[tokio::test]
async fn test_service_with_appointments_cannot_be_deleted() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;
    let profile = ctx.create_profile("sidorova").await;
    ctx.server
        .post("/api/appointments")
        .json(&json!({
            "user_profile_id": id_of(&profile),
            "service_id": id_of(&service),
            "branch_id": id_of(&branch),
            "date": NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            "time": "10:30:00",
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .delete(&format!("/api/services/{}", id_of(&service)))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({
        "error": "Cannot delete the service because appointments reference it"
    }));
}

#[tokio::test]
async fn test_duplicate_link_is_a_non_field_error() {
    let ctx = TestContext::new();
    let branch = ctx.create_branch("Central", "central@mfc.ru").await;
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;
    let payload = json!({
        "branch_id": id_of(&branch),
        "service_id": id_of(&service),
        "is_available": false,
    });

    let link: Value = ctx
        .server
        .post("/api/branch-services")
        .json(&payload)
        .await
        .json();
    assert_eq!(link["is_available"], false);

    let response = ctx.server.post("/api/branch-services").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "non_field_errors": ["This service is already linked to the branch"]
    }));

    let updated: Value = ctx
        .server
        .put(&format!("/api/branch-services/{}", id_of(&link)))
        .json(&json!({ "is_available": true }))
        .await
        .json();
    assert_eq!(updated["is_available"], true);

    ctx.server
        .delete(&format!("/api/services/{}", id_of(&service)))
        .await
        .assert_status_ok();
    let links: Value = ctx.server.get("/api/branch-services").await.json();
    assert_eq!(links, json!([]));
}

#[tokio::test]
async fn test_update_keeps_omitted_category() {
    let ctx = TestContext::new();
    let service = ctx.create_service("Birth certificate", "DOC", 7).await;

    let body: Value = ctx
        .server
        .put(&format!("/api/services/{}", id_of(&service)))
        .json(&json!({ "name": "Birth certificate copy", "duration_days": 5 }))
        .await
        .json();

    assert_eq!(body["service"]["category"], "DOC");
    assert_eq!(body["service"]["duration_days"], 5);
}

#[rstest]
#[case(json!({ "name": "Fishing permit", "duration_days": "abc" }), "duration_days", "Invalid value")]
#[case(json!({ "name": 42 }), "name", "Invalid value")]
#[tokio::test]
async fn test_mistyped_payload_is_a_field_error(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] message: &str,
) {
    let ctx = TestContext::new();

    let response = ctx.server.post("/api/services").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ field: [message] }));
}

#[tokio::test]
async fn test_malformed_body_is_a_non_field_error() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/services")
        .bytes(Bytes::from_static(b"{\"name\": "))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "non_field_errors": ["Malformed JSON body"] }));
}
