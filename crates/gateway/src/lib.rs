//! HTTP API gateway for Docent.
//!
//! A thin transport adapter over [`DocumentTasks`]:
//!
//! - `POST /upload`              — multipart `file` (pdf/txt), returns a summary
//! - `POST /ask`                 — `{query, documentName}` → `{answer}`
//! - `POST /challenge`           — `{documentName}` → `{questions}`
//! - `POST /evaluate_challenge`  — `{documentName, questions, userAnswers}` → `{feedback}`
//! - `GET  /documents`           — stored document listing
//! - `GET  /health`              — liveness and stored document count
//!
//! Built on Axum; CORS is open to any origin unless origins are configured.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use docent_config::{AppConfig, GatewayConfig};
use docent_pipeline::{DocumentTasks, ModelGateway, TaskError};
use docent_store::InMemoryDocumentStore;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub tasks: DocumentTasks,
    pub config: GatewayConfig,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(tasks: DocumentTasks, config: GatewayConfig) -> SharedState {
        Arc::new(Self { tasks, config })
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/upload", post(api::upload_handler))
        .route("/ask", post(api::ask_handler))
        .route("/challenge", post(api::challenge_handler))
        .route("/evaluate_challenge", post(api::evaluate_challenge_handler))
        .route("/documents", get(api::list_documents_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy: any origin when none are configured, otherwise exactly the
/// configured list.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let router = docent_providers::router::build_from_config(&config);
    let provider = router
        .default()
        .ok_or("No default provider configured")?;
    if !config.has_api_key() {
        warn!(provider = %provider.name(), "No API key configured; generation calls will likely fail");
    }

    let gateway = ModelGateway::from_config(provider, &config);
    info!(
        provider = %gateway.provider_name(),
        model = %gateway.model(),
        structured_output = gateway.supports_structured_output(),
        "Model gateway ready"
    );

    let tasks = DocumentTasks::new(Arc::new(InMemoryDocumentStore::new()), gateway)
        .with_evaluation_concurrency(config.max_concurrent_evaluations);
    let app = build_router(GatewayState::new(tasks, config.gateway.clone()));

    info!(addr = %addr, upload_dir = %config.gateway.upload_dir.display(), "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Errors ---

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map an orchestrator failure to its HTTP status and public message.
pub(crate) fn task_error(e: TaskError) -> ApiError {
    let status = match &e {
        TaskError::InvalidInput(_) | TaskError::UnsupportedFileType { .. } => {
            StatusCode::BAD_REQUEST
        }
        TaskError::DocumentNotFound { .. } => StatusCode::NOT_FOUND,
        TaskError::Extraction(_)
        | TaskError::Generation { .. }
        | TaskError::Decode(_)
        | TaskError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        let detail = std::error::Error::source(&e)
            .map(|s| s.to_string())
            .unwrap_or_default();
        error!(error = %e, detail = %detail, "Request failed");
    }

    api_error(status, e.to_string())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: String,
    model: String,
    documents: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let gateway = state.tasks.gateway();
    let documents = state.tasks.store().count().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to count stored documents");
        0
    });
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        provider: gateway.provider_name().to_string(),
        model: gateway.model().to_string(),
        documents,
    })
}
