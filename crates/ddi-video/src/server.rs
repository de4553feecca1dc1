//! HTTP front end for the video pipeline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::jobs::{JobStart, JobTable};
use crate::payload::AnimationPayload;
use crate::pipeline::VideoPipeline;
use crate::requester::AnimationError;

/// Shared service state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<VideoPipeline>,
    jobs: Arc<JobTable>,
    respond_within: Duration,
    videos_dir: Option<PathBuf>,
}

impl AppState {
    /// `respond_within` bounds how long a request waits before answering "pending".
    pub fn new(pipeline: Arc<VideoPipeline>, respond_within: Duration) -> Self {
        Self {
            pipeline,
            jobs: Arc::new(JobTable::new()),
            respond_within,
            videos_dir: None,
        }
    }

    /// Serve files from `dir` under `/videos`.
    pub fn with_videos_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.videos_dir = Some(dir.into());
        self
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/generate-video", post(generate_video))
        .route("/health", get(health));

    if let Some(dir) = &state.videos_dir {
        app = app.nest_service("/videos", ServeDir::new(dir));
    }

    app.with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "video service listening");
    axum::serve(listener, router(state)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn generate_video(
    State(state): State<AppState>,
    body: Result<Json<AnimationPayload>, JsonRejection>,
) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejecting unreadable payload");
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };

    if let Err(e) = payload.validate_for_render() {
        warn!(error = %e, "rejecting incomplete payload");
        let detail = match e {
            AnimationError::MissingField(field) => field,
            other => other.to_string(),
        };
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing required fields: {}", detail),
        );
    }

    let key = payload.idempotency_key();
    let job_id = match state.jobs.begin(&key) {
        JobStart::Done(url) => return ready(url),
        JobStart::InProgress { job_id } => return pending(job_id),
        JobStart::Failed(msg) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, msg),
        JobStart::Started { job_id } => job_id,
    };
    info!(key = %key, job_id = %job_id, drug1 = %payload.drug1, drug2 = %payload.drug2, "render started");

    let pipeline = state.pipeline.clone();
    let jobs = state.jobs.clone();
    let task_key = key.clone();
    let task = tokio::task::spawn_blocking(move || {
        let result = pipeline.generate(&payload).map_err(|e| e.to_string());
        jobs.finish(&task_key, result.clone());
        result
    });

    match tokio::time::timeout(state.respond_within, task).await {
        Ok(Ok(Ok(url))) => ready(url),
        Ok(Ok(Err(msg))) => {
            state.jobs.clear_failure(&key);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
        Ok(Err(join_error)) => {
            error!(key = %key, error = %join_error, "render task aborted");
            state.jobs.finish(&key, Err(join_error.to_string()));
            state.jobs.clear_failure(&key);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "render task aborted".to_string())
        }
        Err(_) => {
            info!(key = %key, job_id = %job_id, "render still running, answering pending");
            pending(job_id)
        }
    }
}

fn ready(url: String) -> Response {
    (StatusCode::OK, Json(json!({ "videoUrl": url }))).into_response()
}

fn pending(job_id: String) -> Response {
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "pending", "jobId": job_id })),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
