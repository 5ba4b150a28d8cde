use crate::ask_payload::AskPayload;
use crate::session_cookie::{self, SessionCookie};
use crate::session_store::{self, SessionStore};
use crate::view::PageRenderer;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use pdf_qa::{ErrorResponse, QueryService};
use serde::Serialize;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
    pub sessions: SessionStore,
    pub renderer: Arc<PageRenderer>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            error: error.into(),
        }),
    )
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/ask", post(ask))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
) -> Result<Response, ApiError> {
    let (id, handle, created) = state.sessions.load_or_create(cookie).await;

    let mut session = handle.lock().await;
    let page = state.renderer.render(&session).map_err(|e| {
        log::error!("Failed to render page: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to render page")
    })?;
    *session = std::mem::take(&mut *session).without_notice();
    drop(session);

    Ok(session_cookie::attach(Html(page).into_response(), id, created))
}

async fn upload(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let (id, handle, created) = state.sessions.load_or_create(cookie).await;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // An empty file input still submits a part with no filename
        if field.file_name().map_or(true, str::is_empty) {
            break;
        }
        if !is_pdf(field.file_name(), field.content_type()) {
            log::warn!("Rejected non-PDF upload {:?}", field.file_name());
            session_store::transition(&handle, |session| async move {
                session.with_rejected_upload()
            })
            .await;
            return Ok(session_cookie::attach(Redirect::to("/").into_response(), id, created));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
        upload = Some(bytes.to_vec());
        break;
    }

    if let Some(bytes) = upload {
        session_store::transition(&handle, |session| state.service.upload(session, bytes)).await;
    }

    Ok(session_cookie::attach(Redirect::to("/").into_response(), id, created))
}

async fn ask(
    State(state): State<AppState>,
    SessionCookie(cookie): SessionCookie,
    Form(payload): Form<AskPayload>,
) -> Response {
    let (id, handle, created) = state.sessions.load_or_create(cookie).await;

    session_store::transition(&handle, |session| state.service.ask(session, &payload.question))
        .await;

    session_cookie::attach(Redirect::to("/").into_response(), id, created)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn is_pdf(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_name = file_name
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    by_name || content_type == Some("application/pdf")
}
