use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::admission::domain::ApplicationIntake;
use crate::workflows::admission::pipeline::AdmissionPipeline;
use crate::workflows::admission::router::{admission_router, submit_handler};
use crate::workflows::admission::service::AdmissionService;

fn eligible_documents() -> MapExtractor {
    MapExtractor::documents(
        &marksheet_text("Riya", 75.0, 80.0, 500),
        &identity_text("Riya Sen", "1234 5678 9012"),
    )
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<axum::body::Body> {
    Request::get(uri)
        .body(axum::body::Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_route_returns_pipeline_report() {
    let (service, _, _) = build_service(eligible_documents());
    let router = admission_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/admissions/applications",
            serde_json::to_value(loan_intake("riya@example.edu", 3.0)).expect("intake json"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["state"]["state"], json!("loan_decided"));
    assert_eq!(payload["record"]["validation_status"], json!("Valid"));
    assert_eq!(payload["record"]["loan_status"], json!("Approved"));
    assert_eq!(payload["run_log"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn submit_handler_rejects_invalid_intake() {
    let (service, store, _) = build_service(eligible_documents());

    let response = submit_handler::<MemoryStore, MapExtractor, RecordingMailer>(
        State(Arc::new(service)),
        axum::Json(ApplicationIntake {
            email: None,
            ..intake("unused@example.edu")
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|error| error.contains("email")));
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn submit_route_rejects_duplicate_application_id() {
    let (service, _, _) = build_service(eligible_documents());
    let router = admission_router(Arc::new(service));
    let body = json!({ "app_id": "app-1", "email": "riya@example.edu" });

    let first = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/admissions/applications", body.clone()))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(json_request("POST", "/api/v1/admissions/applications", body))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let payload = read_json_body(second).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|error| error.contains("already exists")));
}

#[tokio::test]
async fn submit_handler_reports_storage_faults() {
    let (pipeline, _) = pipeline(eligible_documents());
    let service = Arc::new(AdmissionService::new(Arc::new(UnavailableStore), pipeline));

    let response = submit_handler::<UnavailableStore, MapExtractor, RecordingMailer>(
        State(service),
        axum::Json(intake("riya@example.edu")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn application_route_finds_submitted_record() {
    let (service, _, _) = build_service(eligible_documents());
    let service = Arc::new(service);
    let report = service
        .submit(intake("riya@example.edu"))
        .expect("submission succeeds");
    let router = admission_router(service);

    let found = router
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/admissions/applications/{}",
            report.app_id
        )))
        .await
        .expect("route executes");
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["app_id"], json!(report.app_id.as_str()));
    assert_eq!(payload["aadhaar_name"], json!("Riya Sen"));

    let missing = router
        .oneshot(get_request("/api/v1/admissions/applications/unknown"))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_expose_dashboard_shortlist_and_audit_log() {
    let store = MemoryStore::default();
    let service = Arc::new(AdmissionService::new(
        Arc::new(store),
        AdmissionPipeline::new(eligible_documents(), RecordingMailer::default()),
    ));
    service
        .submit(intake("riya@example.edu"))
        .expect("submission succeeds");
    let router = admission_router(service);

    let shortlist = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/admissions/shortlist", json!({})))
        .await
        .expect("route executes");
    assert_eq!(shortlist.status(), StatusCode::OK);
    let payload = read_json_body(shortlist).await;
    assert_eq!(payload["shortlisted"].as_array().map(Vec::len), Some(1));

    let dashboard = router
        .clone()
        .oneshot(get_request("/api/v1/admissions/dashboard"))
        .await
        .expect("route executes");
    let payload = read_json_body(dashboard).await;
    assert_eq!(payload["total_applications"], json!(1));
    assert_eq!(payload["remaining_loan_budget"], json!(12000));

    let audit = router
        .oneshot(get_request("/api/v1/admissions/audit-log"))
        .await
        .expect("route executes");
    let payload = read_json_body(audit).await;
    assert_eq!(payload["entries"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn criteria_route_rejects_missing_documents() {
    let (service, _, _) = build_service(eligible_documents());
    let router = admission_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/admissions/criteria",
            json!({ "path": "/nonexistent/criteria.pdf" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
