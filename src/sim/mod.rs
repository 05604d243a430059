//! Local stand-in for the remote print API and its object store.
//!
//! Serves the credential request and job log on one path and accepts the
//! pre-signed PUTs on `/uploads/{key}`. Failures can be injected per step so
//! the client can be exercised end to end without the real service.

use crate::api::{CredentialQuery, JobLogRequest, JobLogResponse, UploadCredentials};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const DEFAULT_API_PATH: &str = "/default/lambda_print";
const SIGNATURE_PARAM: &str = "X-Amz-Signature";
const FIRST_JOB_NUMBER: u64 = 100;

#[derive(Debug, Clone)]
pub struct MockSettings {
    /// Base URL the issued upload URLs point at. Defaults to the bound address.
    pub public_url: Option<String>,
    pub api_path: String,
    pub fail_credentials: Option<StatusCode>,
    pub fail_storage: Option<StatusCode>,
    pub fail_log: Option<StatusCode>,
    pub omit_job_id: bool,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            public_url: None,
            api_path: DEFAULT_API_PATH.to_string(),
            fail_credentials: None,
            fail_storage: None,
            fail_log: None,
            omit_job_id: false,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingUpload {
    signature: String,
    media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub media_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct LoggedJob {
    pub job_id: String,
    pub request: JobLogRequest,
    pub logged_at: DateTime<Utc>,
}

/// Shared state behind the mock routes.
#[derive(Debug)]
pub struct MockPrintApi {
    settings: MockSettings,
    public_url: String,
    pending: Mutex<HashMap<String, PendingUpload>>,
    objects: Mutex<HashMap<String, StoredObject>>,
    jobs: Mutex<Vec<LoggedJob>>,
    credential_requests: Mutex<Vec<CredentialQuery>>,
    next_job: AtomicU64,
}

pub type AppState = Arc<MockPrintApi>;

impl MockPrintApi {
    pub fn new(mut settings: MockSettings, public_url: &str) -> Self {
        if !settings.api_path.starts_with('/') {
            settings.api_path.insert(0, '/');
        }
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            settings,
            pending: Mutex::new(HashMap::new()),
            objects: Mutex::new(HashMap::new()),
            jobs: Mutex::new(Vec::new()),
            credential_requests: Mutex::new(Vec::new()),
            next_job: AtomicU64::new(FIRST_JOB_NUMBER),
        }
    }

    /// Endpoint a client should be configured with.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.public_url, self.settings.api_path)
    }

    pub fn credential_requests(&self) -> Vec<CredentialQuery> {
        lock(&self.credential_requests).clone()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn jobs(&self) -> Vec<LoggedJob> {
        lock(&self.jobs).clone()
    }
}

// Every update is a single insert or push, so a poisoned map is still whole.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Creates the Axum router for the mock API.
pub fn create_router(state: AppState) -> Router {
    let api_path = state.settings.api_path.clone();
    Router::new()
        .route(&api_path, get(issue_upload_url).post(log_job))
        .route("/uploads/{key}", put(store_object))
        .with_state(state)
}

/// Bind `addr` and serve the mock API in the background.
pub async fn spawn(settings: MockSettings, addr: SocketAddr) -> std::io::Result<(SocketAddr, AppState)> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let public_url = settings
        .public_url
        .clone()
        .unwrap_or_else(|| format!("http://{}", local_addr));
    let state = Arc::new(MockPrintApi::new(settings, &public_url));
    let app = create_router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Mock print API stopped: {}", e);
        }
    });
    tracing::info!("Mock print API listening on http://{}", local_addr);
    Ok((local_addr, state))
}

/// Handler issuing a pre-signed upload URL.
async fn issue_upload_url(
    State(state): State<AppState>,
    Query(query): Query<CredentialQuery>,
) -> Result<Json<UploadCredentials>, StatusCode> {
    tracing::info!("Upload URL requested for {} ({})", query.file_name, query.file_type);
    lock(&state.credential_requests).push(query.clone());
    if let Some(status) = state.settings.fail_credentials {
        return Err(status);
    }

    let object_id = uuid::Uuid::new_v4().simple().to_string();
    let key = format!("{}.pdf", object_id);
    let signature = uuid::Uuid::new_v4().simple().to_string();
    lock(&state.pending).insert(
        key.clone(),
        PendingUpload {
            signature: signature.clone(),
            media_type: query.file_type,
        },
    );

    Ok(Json(UploadCredentials {
        upload_url: format!("{}/uploads/{}?{}={}", state.public_url, key, SIGNATURE_PARAM, signature),
        key: format!("uploads/{}", key),
    }))
}

/// Handler for the pre-signed PUT.
async fn store_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(status) = state.settings.fail_storage {
        return status;
    }
    let Some(pending) = lock(&state.pending).get(&key).cloned() else {
        tracing::warn!("PUT for unknown key {}", key);
        return StatusCode::FORBIDDEN;
    };
    if params.get(SIGNATURE_PARAM) != Some(&pending.signature) {
        tracing::warn!("Signature mismatch for {}", key);
        return StatusCode::FORBIDDEN;
    }
    let media_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if media_type != pending.media_type {
        tracing::warn!("Content-Type {} does not match signed {}", media_type, pending.media_type);
        return StatusCode::FORBIDDEN;
    }

    tracing::info!("Stored {} ({} bytes)", key, body.len());
    lock(&state.pending).remove(&key);
    lock(&state.objects).insert(
        format!("uploads/{}", key),
        StoredObject {
            media_type: media_type.to_string(),
            content: body.to_vec(),
        },
    );
    StatusCode::OK
}

/// Handler recording a print job.
async fn log_job(
    State(state): State<AppState>,
    Json(request): Json<JobLogRequest>,
) -> Result<Json<JobLogResponse>, StatusCode> {
    if let Some(status) = state.settings.fail_log {
        tracing::warn!("Rejecting job log for {}", request.file_name);
        return Err(status);
    }
    let job_id = format!("J-{}", state.next_job.fetch_add(1, Ordering::SeqCst));
    tracing::info!(
        "Logged {} for {} x{} (color: {:?})",
        job_id,
        request.file_name,
        request.copies,
        request.is_color
    );
    lock(&state.jobs).push(LoggedJob {
        job_id: job_id.clone(),
        request,
        logged_at: Utc::now(),
    });
    Ok(Json(JobLogResponse {
        job_id: (!state.settings.omit_job_id).then_some(job_id),
    }))
}
