use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

/// Actions recorded in `audit_logs`. Kept as an enum so a typo in an action
/// name is a compile error, not a silent gap in the trail.
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    CartUpdate,
    CartRemove,
    CartAddViaChat,
    CartRemoveViaChat,
    Checkout,
}

impl AuditAction {
    fn as_str(self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::CartUpdate => "cart_update",
            AuditAction::CartRemove => "cart_remove",
            AuditAction::CartAddViaChat => "cart_add_via_chat",
            AuditAction::CartRemoveViaChat => "cart_remove_via_chat",
            AuditAction::Checkout => "checkout",
        }
    }

    fn resource(self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserLogin => "users",
            AuditAction::CartUpdate
            | AuditAction::CartRemove
            | AuditAction::CartAddViaChat
            | AuditAction::CartRemoveViaChat => "cart_items",
            AuditAction::Checkout => "purchases",
        }
    }
}

/// Best-effort trail write. Callers warn-and-continue on failure; a lost
/// audit row must never fail the operation it describes.
pub async fn record(
    pool: &DbPool,
    user_id: Uuid,
    action: AuditAction,
    metadata: Value,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO audit_logs (id, user_id, action, resource, metadata) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action.as_str())
    .bind(action.resource())
    .bind(metadata)
    .execute(pool)
    .await?;
    Ok(())
}
