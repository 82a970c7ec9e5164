use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::chat::{ChatMessageRequest, ChatMessageResponse, SessionHistory, SessionList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{chat, session_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/message", post(send_message))
        .route("/sessions", get(list_sessions))
        .route("/history/{session_id}", get(session_history))
}

#[utoipa::path(
    post,
    path = "/api/chat/message",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatMessageResponse),
        (status = 400, description = "Empty message"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChatMessageRequest>,
) -> AppResult<Json<ChatMessageResponse>> {
    let resp = chat::handle_chat_message(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/chat/sessions",
    responses(
        (status = 200, description = "Sessions with last message preview", body = ApiResponse<SessionList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SessionList>>> {
    let resp = session_service::list_sessions(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/chat/history/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Chat session ID")
    ),
    responses(
        (status = 200, description = "Full session history", body = ApiResponse<SessionHistory>),
        (status = 404, description = "Session not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Chat"
)]
pub async fn session_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SessionHistory>>> {
    let resp = session_service::session_history(&state.pool, &user, session_id).await?;
    Ok(Json(resp))
}
