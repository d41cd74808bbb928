//! HTTP API for member registration

use crate::registration::{
    Directory, DirectoryEntry, FieldErrors, FormState, Notification, Notifier, PhotoUpload,
    RegistrationBackend, RegistrationDraft, RegistrationForm, RegistrationRecord,
    SubmissionOutcome,
};
use crate::sessions::SessionStore;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn RegistrationBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(backend: Arc<dyn RegistrationBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            sessions: Arc::new(SessionStore::default()),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }

    async fn session(&self, id: Uuid) -> Option<Arc<RegistrationForm>> {
        self.sessions.get(id).await
    }
}

// Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub state: FormState,
    pub can_submit: bool,
}

impl SessionResponse {
    fn of(form: &RegistrationForm) -> Self {
        Self {
            session_id: form.id(),
            state: form.state(),
            can_submit: form.can_submit(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub state: FormState,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RegistrationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    fn of(form: &RegistrationForm) -> Self {
        Self {
            state: form.state(),
            can_submit: form.can_submit(),
            record: None,
            errors: None,
            notification: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub data_url: String,
}

#[derive(Debug, Serialize)]
pub struct DirectoryResponse {
    pub doctors: Vec<DirectoryEntry>,
    pub members: Vec<DirectoryEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            notification: None,
        }),
    )
        .into_response()
}

fn multipart_error(e: MultipartError) -> Response {
    warn!("Rejected multipart body: {}", e);
    error_response(e.status(), e.body_text())
}

// Configure routes
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(session_status))
        .route("/sessions/:id/submit", post(submit_registration))
        .route("/photo/preview", post(preview_photo))
        .route("/directory", get(list_directory))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        service: "member-registry".to_string(),
    })
}

async fn create_session(State(state): State<AppState>) -> Response {
    let form = Arc::new(RegistrationForm::new(
        state.backend.clone(),
        state.notifier.clone(),
    ));
    let response = SessionResponse::of(&form);

    if let Err(e) = state.sessions.insert(form).await {
        warn!("Refused new session: {}", e);
        return error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string());
    }

    info!("Opened registration session {}", response.session_id);
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn session_status(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.session(id).await {
        Some(form) => Json(SessionResponse::of(&form)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Unknown session {}", id)),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Reads the registration form fields out of a multipart body.
pub async fn read_draft(mut multipart: Multipart) -> Result<RegistrationDraft, MultipartError> {
    let mut draft = RegistrationDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "photo" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was picked.
            if !(file_name.is_empty() && data.is_empty()) {
                draft.photo = Some(PhotoUpload::new(file_name, content_type, data.to_vec()));
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "fullName" => draft.full_name = value,
            "designation" => draft.designation = value,
            "organization" => draft.organization = value,
            "email" => draft.email = value,
            "contact" => draft.contact = value,
            "isDoctor" => draft.is_doctor = parse_flag(&value),
            "hospitalName" => draft.hospital_name = Some(value),
            "specialty" => draft.specialty = Some(value),
            "confirmAccuracy" => draft.confirm_accuracy = parse_flag(&value),
            "consentUsage" => draft.consent_usage = parse_flag(&value),
            "agreeTerms" => draft.agree_terms = parse_flag(&value),
            other => debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok(draft)
}

async fn submit_registration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let Some(form) = state.session(id).await else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown session {}", id));
    };

    let draft = match read_draft(multipart).await {
        Ok(draft) => draft,
        Err(e) => return multipart_error(e),
    };

    let outcome = match form.submit(&draft).await {
        Ok(outcome) => outcome,
        Err(e) => {
            info!("Submit rejected for session {}: {}", id, e);
            return error_response(StatusCode::CONFLICT, e.to_string());
        }
    };

    let mut response = SubmitResponse::of(&form);
    let status = match outcome {
        SubmissionOutcome::Submitted(record) => {
            response.record = Some(record);
            response.notification = Some(Notification::registration_succeeded());
            StatusCode::CREATED
        }
        SubmissionOutcome::Invalid(errors) => {
            response.errors = Some(errors);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SubmissionOutcome::Failed(e) => {
            response.error = Some(e.to_string());
            response.notification = Some(Notification::registration_failed());
            StatusCode::BAD_GATEWAY
        }
    };

    (status, Json(response)).into_response()
}

async fn preview_photo(multipart: Multipart) -> Response {
    let draft = match read_draft(multipart).await {
        Ok(draft) => draft,
        Err(e) => return multipart_error(e),
    };

    let Some(photo) = draft.photo else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'photo' file field");
    };

    let data_url = photo.preview().await;
    Json(PreviewResponse { data_url }).into_response()
}

async fn list_directory(State(state): State<AppState>) -> Response {
    let directory = Directory::new(state.backend.clone(), state.notifier.clone());

    match directory.load().await {
        Ok(listing) => {
            let count = listing.len();
            Json(DirectoryResponse {
                doctors: listing.doctors,
                members: listing.members,
                count,
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: e.to_string(),
                notification: Some(Notification::directory_unavailable()),
            }),
        )
            .into_response(),
    }
}
