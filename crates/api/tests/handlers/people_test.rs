use axum::http::StatusCode;
use mfc_core::rules::TransitionPolicy;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, id_of};

struct Booking {
    branch: Value,
    service: Value,
    profile: Value,
}

async fn setup(ctx: &TestContext) -> Booking {
    Booking {
        branch: ctx.create_branch("Central", "central@mfc.ru").await,
        service: ctx.create_service("Birth certificate", "DOC", 7).await,
        profile: ctx.create_profile("kuznetsova").await,
    }
}

fn appointment_payload(booking: &Booking) -> Value {
    json!({
        "user_profile_id": id_of(&booking.profile),
        "service_id": id_of(&booking.service),
        "branch_id": id_of(&booking.branch),
        "date": "2026-11-02",
        "time": "09:15:00",
    })
}

#[tokio::test]
async fn test_profile_defaults_to_client() {
    let ctx = TestContext::new();

    let profile = ctx.create_profile("orlov").await;

    assert_eq!(profile["role"], "client");
    assert_eq!(profile["email"], "orlov@mail.ru");
}

#[tokio::test]
async fn test_profile_search_spans_fields() {
    let ctx = TestContext::new();
    ctx.create_profile("orlov").await;
    ctx.create_profile("belova").await;

    let found: Value = ctx
        .server
        .get("/api/profiles")
        .add_query_param("search", "BELOVA@")
        .await
        .json();
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    assert_eq!(found[0]["username"], "belova");

    let clients: Value = ctx
        .server
        .get("/api/profiles")
        .add_query_param("role", "client")
        .await
        .json();
    assert_eq!(clients.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_hiring_promotes_the_profile() {
    let ctx = TestContext::new();
    let booking = setup(&ctx).await;

    let response = ctx
        .server
        .post("/api/employees")
        .json(&json!({
            "user_profile_id": id_of(&booking.profile),
            "office_id": id_of(&booking.branch),
            "position": "consultant",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let employee: Value = response.json();
    assert_eq!(employee["position"], "consultant");

    let profile: Value = ctx
        .server
        .get(&format!("/api/profiles/{}", id_of(&booking.profile)))
        .await
        .json();
    assert_eq!(profile["role"], "employee");

    let listed: Value = ctx
        .server
        .get("/api/employees")
        .add_query_param("office", id_of(&booking.branch))
        .await
        .json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let second = ctx
        .server
        .post("/api/employees")
        .json(&json!({
            "user_profile_id": id_of(&booking.profile),
            "office_id": id_of(&booking.branch),
        }))
        .await;
    second.assert_status(StatusCode::BAD_REQUEST);
    second.assert_json(&json!({
        "user_profile_id": ["This profile already has an employee record"]
    }));
}

#[tokio::test]
async fn test_unknown_position_is_rejected() {
    let ctx = TestContext::new();
    let booking = setup(&ctx).await;

    let response = ctx
        .server
        .post("/api/employees")
        .json(&json!({
            "user_profile_id": id_of(&booking.profile),
            "office_id": id_of(&booking.branch),
            "position": "janitor",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "position": ["\"janitor\" is not a valid choice"]
    }));
}

#[tokio::test]
async fn test_booking_reports_missing_references() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&json!({
            "user_profile_id": Uuid::new_v4(),
            "service_id": Uuid::new_v4(),
            "branch_id": Uuid::new_v4(),
            "date": "2026-11-02",
            "time": "09:15:00",
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    for field in ["user_profile_id", "service_id", "branch_id"] {
        assert_eq!(body[field], json!(["Referenced record does not exist"]));
    }
}

#[tokio::test]
async fn test_status_changes_are_permissive_by_default() {
    let ctx = TestContext::new();
    let booking = setup(&ctx).await;
    let appointment: Value = ctx
        .server
        .post("/api/appointments")
        .json(&appointment_payload(&booking))
        .await
        .json();
    assert_eq!(appointment["status"], "PENDING");
    let path = format!("/api/appointments/{}/status", id_of(&appointment));

    let completed: Value = ctx
        .server
        .post(&path)
        .json(&json!({ "status": "COMPLETED" }))
        .await
        .json();
    assert_eq!(completed["status"], "COMPLETED");

    let reopened: Value = ctx
        .server
        .post(&path)
        .json(&json!({ "status": "PENDING" }))
        .await
        .json();
    assert_eq!(reopened["status"], "PENDING");
}

#[tokio::test]
async fn test_enforced_transitions_follow_the_lifecycle() {
    let ctx = TestContext::with_options(None, TransitionPolicy::Enforced);
    let booking = setup(&ctx).await;
    let appointment: Value = ctx
        .server
        .post("/api/appointments")
        .json(&appointment_payload(&booking))
        .await
        .json();
    let id = id_of(&appointment);
    let path = format!("/api/appointments/{id}/status");

    let skipped = ctx
        .server
        .post(&path)
        .json(&json!({ "status": "COMPLETED" }))
        .await;
    skipped.assert_status(StatusCode::BAD_REQUEST);
    skipped.assert_json(&json!({
        "status": ["Cannot change status from PENDING to COMPLETED"]
    }));

    for status in ["CONFIRMED", "IN_PROGRESS", "COMPLETED"] {
        ctx.server
            .post(&path)
            .json(&json!({ "status": status }))
            .await
            .assert_status_ok();
    }

    let history: Value = ctx
        .server
        .get(&format!("/api/appointments/{id}/history"))
        .await
        .json();
    assert_eq!(history.as_array().map(Vec::len), Some(4));
    assert_eq!(history[0]["snapshot"]["status"], "COMPLETED");
}

#[tokio::test]
async fn test_appointment_list_filters() {
    let ctx = TestContext::new();
    let booking = setup(&ctx).await;
    ctx.server
        .post("/api/appointments")
        .json(&appointment_payload(&booking))
        .await
        .assert_status(StatusCode::CREATED);

    let on_day: Value = ctx
        .server
        .get("/api/appointments")
        .add_query_param("date", "2026-11-02")
        .add_query_param("status", "PENDING")
        .await
        .json();
    assert_eq!(on_day.as_array().map(Vec::len), Some(1));

    let other_day: Value = ctx
        .server
        .get("/api/appointments")
        .add_query_param("date", "2026-11-03")
        .await
        .json();
    assert_eq!(other_day, json!([]));
}

#[tokio::test]
async fn test_deleting_a_profile_cascades() {
    let ctx = TestContext::new();
    let booking = setup(&ctx).await;
    let profile_id = id_of(&booking.profile);
    ctx.server
        .post("/api/employees")
        .json(&json!({
            "user_profile_id": profile_id,
            "office_id": id_of(&booking.branch),
        }))
        .await
        .assert_status(StatusCode::CREATED);
    ctx.server
        .post("/api/appointments")
        .json(&appointment_payload(&booking))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.server
        .delete(&format!("/api/profiles/{profile_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let employees: Value = ctx.server.get("/api/employees").await.json();
    let appointments: Value = ctx.server.get("/api/appointments").await.json();
    assert_eq!(employees, json!([]));
    assert_eq!(appointments, json!([]));

    // With its dependents gone the branch can be removed.
    ctx.server
        .delete(&format!("/api/branches/{}", id_of(&booking.branch)))
        .await
        .assert_status_ok();
}
