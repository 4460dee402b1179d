use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::pipeline::Pipeline;
use crate::tasks::TaskManager;

const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub tasks: TaskManager,
    pub upload_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: Pipeline, server: &ServerConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tasks: TaskManager::new(),
            upload_dir: PathBuf::from(&server.upload_dir),
            export_dir: PathBuf::from(&server.export_dir),
        }
    }
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "donor-roster",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn upload_name(raw: Option<&str>) -> String {
    raw.and_then(|name| std::path::Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "roster.csv".to_string())
}

/// Accept a multipart `file`, store it and start a background conversion
async fn convert(State(state): State<AppState>, mut multipart: Multipart) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("file") {
            let name = upload_name(field.file_name());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some((name, bytes));
            break;
        }
    }
    let (name, bytes) = upload.ok_or_else(|| ApiError(StatusCode::BAD_REQUEST, "missing 'file' field".to_string()))?;

    let internal = |e: std::io::Error| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    tokio::fs::create_dir_all(&state.upload_dir).await.map_err(internal)?;
    tokio::fs::create_dir_all(&state.export_dir).await.map_err(internal)?;

    let (task_id, progress) = state.tasks.start_task().await;
    let input = state.upload_dir.join(format!("{}_{}", task_id, name));
    if let Err(e) = tokio::fs::write(&input, &bytes).await {
        let _ = state.tasks.fail(task_id, e.to_string()).await;
        return Err(internal(e));
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| task_id.to_string());
    let output = state.export_dir.join(format!("{}_modified.csv", stem));
    info!(task_id = %task_id, bytes = bytes.len(), "Upload stored at {}", input.display());

    tokio::spawn(async move {
        match state.pipeline.run_file(&input, Some(&output), &progress).await {
            Ok(result) => {
                let _ = state.tasks.complete(task_id, PathBuf::from(result.output_file)).await;
            }
            Err(e) => {
                error!(task_id = %task_id, "Conversion failed: {}", e);
                let _ = state.tasks.fail(task_id, e.to_string()).await;
            }
        }
    });

    Ok(Json(serde_json::json!({ "task_id": task_id })))
}

async fn task_progress(State(state): State<AppState>, Path(task_id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    state
        .tasks
        .progress(task_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, format!("unknown task {}", task_id)))
}

async fn download(State(state): State<AppState>, Path(task_id): Path<Uuid>) -> Result<Response, ApiError> {
    let Some(snapshot) = state.tasks.progress(task_id).await else {
        return Err(ApiError(StatusCode::NOT_FOUND, format!("unknown task {}", task_id)));
    };
    let Some(path) = state.tasks.output_path(task_id).await else {
        return Err(ApiError(
            StatusCode::CONFLICT,
            format!("task {} is not finished ({:?})", task_id, snapshot.status),
        ));
    };
    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.csv", task_id));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    )
        .into_response())
}

async fn metrics_text() -> impl IntoResponse {
    crate::metrics::render().unwrap_or_default()
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/convert", post(convert))
        .route("/progress/:task_id", get(task_progress))
        .route("/download/:task_id", get(download))
        .route("/metrics", get(metrics_text))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{}", port);
    info!("Upload rosters with POST http://localhost:{}/convert", port);

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
