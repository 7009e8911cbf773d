use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::AppError;

use super::documents::TextExtractor;
use super::domain::{ApplicationId, ApplicationIntake};
use super::mailer::Mailer;
use super::service::{AdmissionService, AdmissionServiceError};
use super::store::DatasetStore;

type SharedService<S, X, M> = Arc<AdmissionService<S, X, M>>;

/// Body of a criteria import request.
#[derive(Debug, Clone, Deserialize)]
pub struct CriteriaImportRequest {
    pub path: PathBuf,
}

/// Router builder exposing intake and administration endpoints.
pub fn admission_router<S, X, M>(service: SharedService<S, X, M>) -> Router
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/applications",
            post(submit_handler::<S, X, M>).get(list_handler::<S, X, M>),
        )
        .route(
            "/api/v1/admissions/applications/:app_id",
            get(application_handler::<S, X, M>),
        )
        .route(
            "/api/v1/admissions/criteria",
            post(criteria_handler::<S, X, M>),
        )
        .route(
            "/api/v1/admissions/shortlist",
            post(shortlist_handler::<S, X, M>),
        )
        .route(
            "/api/v1/admissions/dashboard",
            get(dashboard_handler::<S, X, M>),
        )
        .route(
            "/api/v1/admissions/audit-log",
            get(audit_log_handler::<S, X, M>),
        )
        .with_state(service)
}

/// Run a service call on the blocking pool; document extraction and SMTP are synchronous.
async fn run_blocking<S, X, M, T, F>(service: SharedService<S, X, M>, work: F) -> Result<T, Response>
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
    T: Send + 'static,
    F: FnOnce(&AdmissionService<S, X, M>) -> Result<T, AdmissionServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&service)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(join) => {
            error!(error = %join, "admission task did not complete");
            let payload = json!({ "error": "admission task did not complete" });
            Err((StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response())
        }
    }
}

fn error_response(err: AdmissionServiceError) -> Response {
    if let AdmissionServiceError::Store(_) = &err {
        error!(error = %err, "admission dataset unavailable");
    }
    AppError::from(err).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, outcome: Result<T, Response>) -> Response {
    match outcome {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn submit_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
    axum::Json(intake): axum::Json<ApplicationIntake>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome = run_blocking(service, move |service| service.submit(intake)).await;
    respond(StatusCode::CREATED, outcome)
}

pub(crate) async fn list_handler<S, X, M>(State(service): State<SharedService<S, X, M>>) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome = run_blocking(service, |service| service.applications()).await;
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn application_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
    Path(app_id): Path<String>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let app_id = ApplicationId(app_id);
    let outcome = run_blocking(service, move |service| service.get(&app_id)).await;
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn criteria_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
    axum::Json(request): axum::Json<CriteriaImportRequest>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome =
        run_blocking(service, move |service| service.import_criteria(&request.path)).await;
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn shortlist_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome = run_blocking(service, |service| service.shortlist()).await;
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn dashboard_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome = run_blocking(service, |service| service.dashboard()).await;
    respond(StatusCode::OK, outcome)
}

pub(crate) async fn audit_log_handler<S, X, M>(
    State(service): State<SharedService<S, X, M>>,
) -> Response
where
    S: DatasetStore + 'static,
    X: TextExtractor + 'static,
    M: Mailer + 'static,
{
    let outcome = run_blocking(service, |service| {
        service.audit_log().map(|entries| json!({ "entries": entries }))
    })
    .await;
    respond(StatusCode::OK, outcome)
}
