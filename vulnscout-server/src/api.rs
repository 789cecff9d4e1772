//! HTTP API routes and handlers.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/api/scan` | `202` job ticket |
//! | `POST` | `/api/scan/file` | `202` job ticket with dependency count |
//! | `GET` | `/api/scan/{id}` | report when completed, status otherwise |
//! | `GET` | `/api/scan/{id}/status` | status view |
//! | `GET` | `/api/scan/{id}/export?format=` | exported report (`409` while scanning) |
//! | `GET` | `/api/versions/{ecosystem}/{package}` | sorted version list |
//! | `GET` | `/health` | health report |

use std::time::{Duration, Instant};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use vulnscout_core::config::ServerConfig;
use vulnscout_engine::{
    Ecosystem, ExportFormat, JobStatus, JobTicket, ScanJobManager, ScanRequest, export,
};

use crate::error::ApiError;
use crate::health::HealthResponse;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Scan job manager.
    pub manager: ScanJobManager,
    /// Server start time, for uptime reporting.
    pub started: Instant,
}

impl AppState {
    /// State with the start time set to now.
    pub fn new(manager: ScanJobManager) -> Self {
        Self {
            manager,
            started: Instant::now(),
        }
    }
}

/// Body of `POST /api/scan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScanBody {
    /// Ecosystem name (`pypi`, `npm`, `maven`, `go`, `rubygems`).
    pub ecosystem: String,
    /// Package name.
    pub package: String,
    /// Version; latest when absent or blank.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub deep: bool,
}

/// Body of `POST /api/scan/file`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileScanBody {
    /// Manifest contents.
    pub content: String,
    /// Manifest file name, used for format detection.
    pub file_name: String,
    #[serde(default)]
    pub deep: bool,
}

/// Query of the export route.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Response of the versions route.
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionsResponse {
    pub ecosystem: Ecosystem,
    pub package: String,
    pub versions: Vec<String>,
}

/// Build the API router with tracing, CORS and body-size layers.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/scan", post(create_scan))
        .route("/scan/file", post(create_file_scan))
        .route("/scan/{id}", get(get_scan))
        .route("/scan/{id}/status", get(get_status))
        .route("/scan/{id}/export", get(export_scan))
        .route("/versions/{ecosystem}/{*package}", get(list_versions));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "invalid CORS origin in config; skipping");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

fn parse_ecosystem(raw: &str) -> Result<Ecosystem, ApiError> {
    Ecosystem::from_str_loose(raw).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unsupported ecosystem '{raw}', expected one of: pypi, npm, maven, go, rubygems"
        ))
    })
}

async fn create_scan(
    State(state): State<AppState>,
    payload: Result<Json<PackageScanBody>, JsonRejection>,
) -> Result<(StatusCode, Json<JobTicket>), ApiError> {
    let Json(body) = payload?;
    let ecosystem = parse_ecosystem(&body.ecosystem)?;
    let version = body.version.filter(|v| !v.trim().is_empty());

    let ticket = state
        .manager
        .create(ScanRequest::Package {
            ecosystem,
            package: body.package,
            version,
            deep: body.deep,
        })
        .await?;

    tracing::info!(job_id = %ticket.id, ecosystem = %ecosystem, "package scan accepted");
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

async fn create_file_scan(
    State(state): State<AppState>,
    payload: Result<Json<FileScanBody>, JsonRejection>,
) -> Result<(StatusCode, Json<JobTicket>), ApiError> {
    let Json(body) = payload?;

    let ticket = state
        .manager
        .create(ScanRequest::Manifest {
            file_name: body.file_name,
            content: body.content,
            deep: body.deep,
        })
        .await?;

    tracing::info!(
        job_id = %ticket.id,
        dependencies = ticket.dependency_count.unwrap_or(0),
        "manifest scan accepted"
    );
    Ok((StatusCode::ACCEPTED, Json(ticket)))
}

async fn get_scan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let job = state.manager.get(&id).await?;
    match (job.status, &job.result) {
        (JobStatus::Completed, Some(report)) => Ok(Json(report).into_response()),
        _ => Ok(Json(job.status_view()).into_response()),
    }
}

async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let view = state.manager.status(&id).await?;
    Ok(Json(view).into_response())
}

async fn export_scan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let format = match query.format.as_deref() {
        None => ExportFormat::Json,
        Some(raw) => ExportFormat::from_str_loose(raw).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "unsupported export format '{raw}', expected json, markdown, sarif or table"
            ))
        })?,
    };

    let job = state.manager.get(&id).await?;
    let report = match (job.status, job.result) {
        (JobStatus::Completed, Some(report)) => report,
        (status, _) => {
            return Err(ApiError::Conflict(format!(
                "scan {id} is {status}; export requires a completed scan"
            )));
        }
    };

    let body = export(&report, format)?;
    let disposition = format!(
        "attachment; filename=\"vulnscout-{}.{}\"",
        report.id,
        format.file_extension()
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn list_versions(
    State(state): State<AppState>,
    Path((ecosystem, package)): Path<(String, String)>,
) -> Result<Json<VersionsResponse>, ApiError> {
    let ecosystem = parse_ecosystem(&ecosystem)?;
    let versions = state.manager.engine().versions(ecosystem, &package).await?;

    Ok(Json(VersionsResponse {
        ecosystem,
        package,
        versions,
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let jobs = state.manager.job_count().await;
    Json(HealthResponse::ok(state.started.elapsed().as_secs(), jobs))
}
