//! HTTP API server for the ChainCred node.
//!
//! Provides REST endpoints for issuing credentials from uploaded documents,
//! fetching records and their metadata, anchoring, and verification.

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use chaincred_core::Identity;
use chaincred_credentials::{
    AnchorReceipt, CredentialError, CredentialMetadata, CredentialRecord, IssueRequest,
    VerificationResult,
};

use crate::state::NodeState;

// --- Request / response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub allowed_issuers: usize,
}

#[derive(Deserialize)]
pub struct IssueCredentialRequest {
    pub subject: String,
    pub issuer: String,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    pub document_base64: String,
    #[serde(default)]
    pub expected_fingerprint: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyDocumentRequest {
    pub document_base64: String,
}

#[derive(Serialize)]
pub struct CredentialListResponse {
    pub subject: String,
    pub credentials: Vec<CredentialRecord>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a credential error to an HTTP status. Verification mismatches never
/// get here; they are ordinary `valid: false` results.
fn credential_error(e: CredentialError) -> ApiError {
    let status = match &e {
        CredentialError::NotFound(_) => StatusCode::NOT_FOUND,
        CredentialError::AlreadyExists(_) | CredentialError::AlreadyAnchored(_) => {
            StatusCode::CONFLICT
        }
        CredentialError::UnauthorizedIssuer(_) => StatusCode::FORBIDDEN,
        CredentialError::InvalidDocument(_)
        | CredentialError::VerificationFailed(_)
        | CredentialError::Core(_)
        | CredentialError::Crypto(_) => StatusCode::BAD_REQUEST,
        CredentialError::Storage(_) | CredentialError::Serialization(_) => {
            tracing::error!(error = %e, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, e.to_string())
}

fn decode_document(state: &NodeState, encoded: &str) -> Result<Vec<u8>, ApiError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("invalid base64: {}", e)))?;
    if bytes.len() > state.max_document_bytes {
        return Err(api_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "document is {} bytes, limit is {}",
                bytes.len(),
                state.max_document_bytes
            ),
        ));
    }
    Ok(bytes)
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<NodeState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        allowed_issuers: state.issuer.allowed_issuer_count(),
    })
}

async fn handle_issue_credential(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<IssueCredentialRequest>,
) -> Result<(StatusCode, Json<CredentialRecord>), ApiError> {
    let document = decode_document(&state, &req.document_base64)?;
    let record = state
        .issuer
        .issue(IssueRequest {
            subject: req.subject,
            issuer: req.issuer,
            issued_at: req.issued_at,
            title: req.title,
            document_name: req.document_name,
            document,
            expected_fingerprint: req.expected_fingerprint,
        })
        .await
        .map_err(credential_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn handle_get_credential(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> Result<Json<CredentialRecord>, ApiError> {
    state
        .records
        .get(&id)
        .await
        .map_err(credential_error)?
        .map(Json)
        .ok_or_else(|| credential_error(CredentialError::NotFound(id)))
}

async fn handle_verify_credential(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> Result<Json<VerificationResult>, ApiError> {
    let result = state
        .verifier
        .verify_by_id(&id)
        .await
        .map_err(credential_error)?;
    Ok(Json(result))
}

async fn handle_verify_document(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<VerifyDocumentRequest>,
) -> Result<Json<VerificationResult>, ApiError> {
    let document = decode_document(&state, &req.document_base64)?;
    let result = state
        .verifier
        .verify_document(&document)
        .await
        .map_err(credential_error)?;
    Ok(Json(result))
}

async fn handle_anchor_credential(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> Result<Json<AnchorReceipt>, ApiError> {
    let receipt = state.anchorer.anchor(&id).await.map_err(credential_error)?;
    Ok(Json(receipt))
}

async fn handle_get_metadata(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> Result<Json<CredentialMetadata>, ApiError> {
    state
        .metadata
        .fetch_metadata(&id)
        .await
        .map_err(credential_error)?
        .map(Json)
        .ok_or_else(|| {
            credential_error(CredentialError::NotFound(format!("metadata for {}", id)))
        })
}

async fn handle_list_subject_credentials(
    State(state): State<Arc<NodeState>>,
    Path(subject): Path<String>,
) -> Result<Json<CredentialListResponse>, ApiError> {
    let subject = Identity::parse(&subject).map_err(|e| credential_error(e.into()))?;
    let credentials = state
        .records
        .list_by_subject(subject.as_str())
        .await
        .map_err(credential_error)?;
    let count = credentials.len();
    Ok(Json(CredentialListResponse {
        subject: subject.to_string(),
        credentials,
        count,
    }))
}

// --- Server ---

/// Request body limit for a given decoded document limit. Base64 inflates
/// uploads by 4/3; the extra 64 KiB covers the JSON envelope.
fn body_limit(max_document_bytes: usize) -> usize {
    (max_document_bytes / 3 + 1)
        .saturating_mul(4)
        .saturating_add(64 * 1024)
}

pub fn build_router(state: Arc<NodeState>) -> Router {
    let body_limit = body_limit(state.max_document_bytes);
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/credentials", post(handle_issue_credential))
        .route(
            "/api/v1/credentials/verify-document",
            post(handle_verify_document),
        )
        .route("/api/v1/credentials/{id}", get(handle_get_credential))
        .route(
            "/api/v1/credentials/{id}/verify",
            get(handle_verify_credential),
        )
        .route(
            "/api/v1/credentials/{id}/anchor",
            post(handle_anchor_credential),
        )
        .route("/api/v1/credentials/{id}/metadata", get(handle_get_metadata))
        .route(
            "/api/v1/subjects/{subject}/credentials",
            get(handle_list_subject_credentials),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
