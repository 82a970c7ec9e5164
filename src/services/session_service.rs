use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::chat::{SessionHistory, SessionList, SessionSummary},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ChatMessage, ChatSession, ProductRef},
    response::ApiResponse,
};

/// How a chat turn picks its session. Kept explicit so the three branches
/// are independently testable instead of living in inline conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionResolutionPolicy {
    RequireNew,
    RequireExact(Uuid),
    FallbackToLatestOrCreate,
}

impl SessionResolutionPolicy {
    pub fn from_request(is_new_chat: bool, session_id: Option<Uuid>) -> Self {
        if is_new_chat {
            SessionResolutionPolicy::RequireNew
        } else if let Some(id) = session_id {
            SessionResolutionPolicy::RequireExact(id)
        } else {
            SessionResolutionPolicy::FallbackToLatestOrCreate
        }
    }
}

/// Returns the resolved session and whether it was created by this call.
/// An unknown or foreign session id self-heals to a fresh session rather
/// than failing the turn.
pub async fn resolve_session(
    pool: &DbPool,
    user_id: Uuid,
    policy: SessionResolutionPolicy,
) -> AppResult<(ChatSession, bool)> {
    match policy {
        SessionResolutionPolicy::RequireNew => Ok((create_session(pool, user_id).await?, true)),
        SessionResolutionPolicy::RequireExact(id) => match find_session(pool, user_id, id).await? {
            Some(session) => Ok((session, false)),
            None => Ok((create_session(pool, user_id).await?, true)),
        },
        SessionResolutionPolicy::FallbackToLatestOrCreate => {
            match latest_session(pool, user_id).await? {
                Some(session) => Ok((session, false)),
                None => Ok((create_session(pool, user_id).await?, true)),
            }
        }
    }
}

pub async fn create_session(pool: &DbPool, user_id: Uuid) -> AppResult<ChatSession> {
    let session = sqlx::query_as::<_, ChatSession>(
        "INSERT INTO chat_sessions (id, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(session)
}

pub async fn find_session(
    pool: &DbPool,
    user_id: Uuid,
    id: Uuid,
) -> AppResult<Option<ChatSession>> {
    let session = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

pub async fn latest_session(pool: &DbPool, user_id: Uuid) -> AppResult<Option<ChatSession>> {
    let session = sqlx::query_as::<_, ChatSession>(
        "SELECT * FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

pub async fn touch_session(pool: &DbPool, id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE chat_sessions SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The last `limit` messages of a session, returned chronological.
pub async fn recent_messages(
    pool: &DbPool,
    session_id: Uuid,
    limit: i64,
) -> AppResult<Vec<ChatMessage>> {
    let mut messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    messages.reverse();
    Ok(messages)
}

pub struct NewMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
    pub detected_link: Option<String>,
    pub products: Option<&'a [ProductRef]>,
    pub raw_response: Option<serde_json::Value>,
}

pub async fn append_message(
    pool: &DbPool,
    session_id: Uuid,
    message: NewMessage<'_>,
) -> AppResult<ChatMessage> {
    let stored = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages
            (id, session_id, role, content, detected_link, attached_products, raw_ai_response)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(message.role)
    .bind(message.content)
    .bind(message.detected_link)
    .bind(message.products.map(|p| sqlx::types::Json(p.to_vec())))
    .bind(message.raw_response)
    .fetch_one(pool)
    .await?;
    Ok(stored)
}

#[derive(FromRow)]
struct SessionRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_message: Option<String>,
    last_message_at: Option<DateTime<Utc>>,
}

pub async fn list_sessions(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<SessionList>> {
    let rows = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT s.id, s.created_at, s.updated_at,
               m.content AS last_message, m.created_at AS last_message_at
        FROM chat_sessions s
        LEFT JOIN LATERAL (
            SELECT content, created_at
            FROM chat_messages
            WHERE session_id = s.id
            ORDER BY created_at DESC
            LIMIT 1
        ) m ON true
        WHERE s.user_id = $1
        ORDER BY s.updated_at DESC
        LIMIT 50
        "#,
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| SessionSummary {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_message: row.last_message,
            last_message_at: row.last_message_at,
        })
        .collect();

    Ok(ApiResponse::new("OK", SessionList { items }))
}

pub async fn session_history(
    pool: &DbPool,
    user: &AuthUser,
    session_id: Uuid,
) -> AppResult<ApiResponse<SessionHistory>> {
    let session = find_session(pool, user.user_id, session_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = sqlx::query_as::<_, ChatMessage>(
        "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC LIMIT 200",
    )
    .bind(session.id)
    .fetch_all(pool)
    .await?;

    Ok(ApiResponse::new(
        "OK",
        SessionHistory {
            session_id: session.id,
            items,
        },
    ))
}
