use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ChatMessage, ProductRef};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    #[serde(default)]
    pub is_new_chat: bool,
    pub session_id: Option<Uuid>,
}

/// Wire shape consumed by the storefront widget; field names are part of
/// the client contract and stay camelCase.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub success: bool,
    pub message: String,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub is_new_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopify_products: Option<Vec<ProductRef>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionList {
    pub items: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionHistory {
    pub session_id: Uuid,
    pub items: Vec<ChatMessage>,
}

