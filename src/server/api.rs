use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::mailer::{DispatchOutcome, Mailer, NotifyConfig, dispatch_notifications};
use crate::record::normalize_payload;
use crate::store::{CSV_FILE, StoreHandle};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub store: StoreHandle,
    /// `None` disables notification dispatch; responses then omit the
    /// `emails` field entirely.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub notify: NotifyConfig,
    pub document_root: PathBuf,
    pub maps_api_key: String,
}

pub type SharedState = Arc<AppState>;

/// Fields a submission must carry with non-empty values.
pub const REQUIRED_FIELDS: [&str; 4] =
    ["factoryName", "country", "factoryEmail", "detailedAddress"];

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    Unprocessable(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (
            status,
            Json(serde_json::json!({"success": false, "message": message})),
        )
            .into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/factory-registration", post(register))
        .route("/v2/factory-registration", post(register))
        .route("/api/submissions", get(list_submissions))
        .route("/api/submissions/export", get(export_csv))
        .route("/health", get(health_check))
}

// ── Handlers ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RegistrationResponse {
    success: bool,
    message: &'static str,
    #[serde(rename = "submissionId")]
    submission_id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    emails: Option<DispatchOutcome>,
}

/// Accept a registration submission, persist it, and (when a mailer is
/// configured) dispatch the notification emails.
async fn register(
    State(state): State<SharedState>,
    req: Request,
) -> Result<impl IntoResponse, ApiError> {
    let (parts, body) = req.into_parts();

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("application/json") {
        return Err(ApiError::BadRequest("Expected JSON body".to_string()));
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| ApiError::BadRequest("Expected JSON body".to_string()))?;

    // A JSON null is tolerated as an empty submission (it then fails the
    // required-field check); arrays and scalars are rejected outright.
    let payload: Map<String, Value> = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        _ => return Err(ApiError::BadRequest("Expected JSON body".to_string())),
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| is_missing(payload.get(*name)))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::Unprocessable(format!(
            "Missing fields: {}",
            missing.join(", ")
        )));
    }

    // Echoed back verbatim; the stored copy is normalized separately.
    let submission_id = payload
        .get("submissionId")
        .cloned()
        .unwrap_or(Value::Null);

    let client_ip = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_default();
    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // System fields first; a submitted field of the same name keeps this
    // position but wins on value.
    let mut merged = Map::with_capacity(payload.len() + 3);
    merged.insert(
        "receivedAt".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
    );
    merged.insert("ip".to_string(), Value::String(client_ip));
    merged.insert("userAgent".to_string(), Value::String(user_agent));
    for (key, value) in payload {
        merged.insert(key, value);
    }

    let record = normalize_payload(&merged);

    let stored = record.clone();
    state
        .store
        .call(move |store| store.append(&stored))
        .await
        .map_err(|e| {
            tracing::error!("failed to persist submission: {e:#}");
            ApiError::Internal(e.to_string())
        })?;

    tracing::info!(
        factory = record.get_or("factoryName", ""),
        "registration saved"
    );

    let emails = match &state.mailer {
        Some(mailer) => Some(dispatch_notifications(mailer.as_ref(), &record, &state.notify).await),
        None => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            success: true,
            message: "Registration saved",
            submission_id,
            emails,
        }),
    ))
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

async fn list_submissions(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .store
        .call(|store| store.list())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "total": records.len(),
        "submissions": records,
    })))
}

async fn export_csv(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let bytes = state
        .store
        .call(|store| store.read_csv_bytes())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("No submissions recorded yet".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn health_check() -> &'static str {
    "ok"
}
