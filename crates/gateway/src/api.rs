//! Request handlers for the document endpoints.
//!
//! Field names are camelCase on the wire. Absent, null and empty fields
//! are all treated as missing.

use axum::{
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use docent_core::challenge::{ChallengeSet, EvaluationFeedback};
use docent_core::document::DocumentInfo;
use docent_pipeline::validate_upload_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{ApiError, SharedState, api_error, task_error};

const UPLOAD_SUCCESS: &str = "File uploaded and summarized successfully";

// ── Upload ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub summary: String,
}

pub(crate) async fn upload_handler(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Upload is not a multipart request");
        api_error(StatusCode::BAD_REQUEST, "No file part")
    })?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(api_error(StatusCode::BAD_REQUEST, "No file part"));
    };

    validate_upload_name(&filename).map_err(task_error)?;
    info!(filename = %filename, bytes = bytes.len(), "Upload received");

    save_upload(&state.config.upload_dir, &filename, &bytes).await;

    let outcome = state
        .tasks
        .upload(&filename, bytes)
        .await
        .map_err(task_error)?;

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS.into(),
        summary: outcome.summary,
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    let status = e.status();
    warn!(error = %e, status = %status, "Failed to read multipart upload");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        api_error(status, "File exceeds the upload size limit")
    } else {
        api_error(status, e.body_text())
    }
}

/// Keep a copy of the upload under its final path component.
///
/// Failure to write is logged; the in-memory pipeline does not depend on it.
async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) {
    let Some(path) = upload_path(dir, filename) else {
        warn!(filename = %filename, "Upload name has no usable file component, not saving");
        return;
    };

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!(dir = %dir.display(), error = %e, "Cannot create upload directory");
        return;
    }
    match tokio::fs::write(&path, bytes).await {
        Ok(()) => debug!(path = %path.display(), "Upload saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to save upload"),
    }
}

/// `dir/<basename>`, where the basename ignores any client-side directories.
fn upload_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    let base = filename.rsplit(['/', '\\']).next()?;
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(dir.join(base))
}

// ── Ask ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

pub(crate) async fn ask_handler(
    State(state): State<SharedState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| bad_json(e, "Missing query or document name"))?;

    let answer = state
        .tasks
        .answer(
            req.document_name.as_deref().unwrap_or_default(),
            req.query.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(task_error)?;

    Ok(Json(AskResponse { answer }))
}

// ── Challenge ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub document_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub questions: ChallengeSet,
}

pub(crate) async fn challenge_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChallengeRequest>, JsonRejection>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| bad_json(e, "Missing document name"))?;

    let questions = state
        .tasks
        .generate_challenge(req.document_name.as_deref().unwrap_or_default())
        .await
        .map_err(task_error)?;

    Ok(Json(ChallengeResponse { questions }))
}

// ── Evaluate ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateChallengeRequest {
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<String>>,
    #[serde(default)]
    pub user_answers: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateChallengeResponse {
    pub feedback: EvaluationFeedback,
}

pub(crate) async fn evaluate_challenge_handler(
    State(state): State<SharedState>,
    payload: Result<Json<EvaluateChallengeRequest>, JsonRejection>,
) -> Result<Json<EvaluateChallengeResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| bad_json(e, "Missing data"))?;

    let feedback = state
        .tasks
        .evaluate_challenge(
            req.document_name.as_deref().unwrap_or_default(),
            req.questions.as_deref().unwrap_or_default(),
            &req.user_answers.unwrap_or_default(),
        )
        .await
        .map_err(task_error)?;

    Ok(Json(EvaluateChallengeResponse { feedback }))
}

// ── Documents ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentInfo>,
}

pub(crate) async fn list_documents_handler(
    State(state): State<SharedState>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let documents = state.tasks.documents().await.map_err(task_error)?;
    Ok(Json(DocumentListResponse { documents }))
}

/// An unreadable JSON body counts as missing fields.
fn bad_json(e: JsonRejection, missing_message: &str) -> ApiError {
    debug!(error = %e, "Rejected JSON body");
    api_error(StatusCode::BAD_REQUEST, missing_message)
}
