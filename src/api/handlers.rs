//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    ChatRequest, ChatResponse, ConversationResponse, CreatedResponse, ErrorResponse,
    LoginRequest, LoginResponse, SuccessResponse,
};
use super::AppState;
use crate::auth::AuthError;
use crate::controller::{ChatError, ChatSnapshot};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Observable state
        .route("/api/state", get(get_state))
        .route("/api/stream", get(stream_state))
        // Login gate
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        // Conversation lifecycle
        .route("/api/conversations/new", post(create_conversation))
        .route("/api/conversations/:id", get(get_conversation))
        .route("/api/conversations/:id/select", post(select_conversation))
        .route("/api/conversations/:id/delete", post(delete_conversation))
        // User actions
        .route("/api/conversations/:id/chat", post(send_chat))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Observable State
// ============================================================

async fn get_state(State(state): State<AppState>) -> Json<ChatSnapshot> {
    Json(state.controller.snapshot())
}

async fn stream_state(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    if !state.controller.is_authenticated() {
        return Err(ChatError::NotAuthenticated.into());
    }
    // Subscribe before taking the snapshot so no change falls in between
    let rx = state.controller.subscribe();
    Ok(sse_stream(state.controller.snapshot(), rx))
}

// ============================================================
// Login Gate
// ============================================================

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state
        .controller
        .login(&req.username, &req.password)
        .map_err(|e| match e {
            AuthError::MissingFields => AppError::BadRequest(e.to_string()),
            AuthError::InvalidCredentials => AppError::Unauthorized(e.to_string()),
        })?;

    Ok(Json(LoginResponse { user }))
}

async fn logout(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.controller.logout();
    Json(SuccessResponse { success: true })
}

// ============================================================
// Conversation Lifecycle
// ============================================================

async fn create_conversation(
    State(state): State<AppState>,
) -> Result<Json<CreatedResponse>, AppError> {
    let id = state.controller.create_conversation()?;
    Ok(Json(CreatedResponse { id }))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state.controller.conversation(&id)?;
    Ok(Json(ConversationResponse { conversation }))
}

async fn select_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    let success = state.controller.select_conversation(&id)?;
    Ok(Json(SuccessResponse { success }))
}

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.controller.delete_conversation(&id)?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let pending = state.controller.begin_send(&id, &req.text)?;

    tracing::debug!(conversation_id = %pending.conversation_id(), "Message queued");
    let controller = state.controller.clone();
    tokio::spawn(async move {
        let outcome = controller.complete_send(pending).await;
        tracing::debug!(message_id = %outcome.message().id, "Reply appended");
    });

    Ok(Json(ChatResponse { queued: true }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::NotAuthenticated => AppError::Unauthorized(e.to_string()),
            ChatError::EmptyMessage => AppError::BadRequest(e.to_string()),
            ChatError::ConversationNotFound(_) => AppError::NotFound(e.to_string()),
            ChatError::Busy => AppError::Conflict(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
