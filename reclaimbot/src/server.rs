use crate::sanitize::sanitize_response;
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::IntoResponse,
    routing::{get, post},
};
use reclaim_core::{Content, ReclaimError};
use reclaim_runner::Runner;
use reclaim_session::{CreateRequest, SessionService};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Single shared user id: the chat UI is anonymous, identity comes from the
/// conversation itself.
const WEB_USER_ID: &str = "web";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub runner: Arc<Runner>,
    pub session_service: Arc<dyn SessionService>,
}

#[derive(RustEmbed)]
#[folder = "assets/webui"]
struct Assets;

#[derive(Serialize)]
struct SessionResponse {
    session_id: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn create_app(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/chat", post(chat))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_asset))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let created = state
        .session_service
        .create(CreateRequest {
            app_name: state.app_name.clone(),
            user_id: WEB_USER_ID.to_string(),
            session_id: None,
            state: HashMap::new(),
        })
        .await;

    match created {
        Ok(session) => {
            (StatusCode::OK, Json(SessionResponse { session_id: session.id().to_string() }))
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "session create failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: "could not create session".to_string() }),
            )
                .into_response()
        }
    }
}

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    if req.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: "message must not be empty".to_string() }),
        )
            .into_response();
    }

    let user_content = Content::new("user").with_text(req.message);
    let result = state
        .runner
        .run_collect(WEB_USER_ID.to_string(), req.session_id.clone(), user_content)
        .await;

    match result {
        Ok(raw) => {
            let reply = sanitize_response(&raw);
            (StatusCode::OK, Json(ChatResponse { reply })).into_response()
        }
        Err(ReclaimError::Session(message)) => {
            tracing::warn!(session = %req.session_id, %message, "chat for unknown session");
            (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
        }
        Err(e) => {
            // The turn failed mid-workflow; the customer gets an apology
            // instead of a stack of internals.
            tracing::error!(session = %req.session_id, error = %e, "turn failed");
            (
                StatusCode::OK,
                Json(ChatResponse {
                    reply: "Sorry, I ran into a problem while handling that. Please try again."
                        .to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn serve_index() -> impl IntoResponse {
    serve_embedded("index.html")
}

async fn serve_asset(uri: Uri) -> impl IntoResponse {
    serve_embedded(uri.path().trim_start_matches('/'))
}

fn serve_embedded(path: &str) -> axum::response::Response {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            let mime_header = header::HeaderValue::from_str(mime.as_ref())
                .unwrap_or_else(|_| header::HeaderValue::from_static("application/octet-stream"));
            ([(header::CONTENT_TYPE, mime_header)], Body::from(content.data)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
