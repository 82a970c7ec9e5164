pub mod context;
pub mod focus;
pub mod intent;
pub mod interpret;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    catalog::CatalogError,
    dto::chat::{ChatMessageRequest, ChatMessageResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ChatMessage, ProductRef, ROLE_ASSISTANT, ROLE_USER},
    services::{cart_service, purchase_service, session_service},
    services::session_service::{NewMessage, SessionResolutionPolicy},
    state::AppState,
};

use self::intent::{Intent, IntentSet};
use self::interpret::Action;

/// Messages of the session fed into the prompt as conversation context.
const CONTEXT_WINDOW: i64 = 15;
/// Purchase records shown in the history block.
const HISTORY_LIMIT: i64 = 10;
/// Catalog matches attached to a reply.
const MAX_SEARCH_RESULTS: usize = 5;

/// One chat turn: resolve the session, classify the message, gather the
/// context the intent needs, consult the replica, interpret its reply for a
/// cart mutation, persist both turns, and answer.
pub async fn handle_chat_message(
    state: &AppState,
    user: &AuthUser,
    payload: ChatMessageRequest,
) -> AppResult<ChatMessageResponse> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".into()));
    }

    let policy = SessionResolutionPolicy::from_request(payload.is_new_chat, payload.session_id);
    let (session, is_new_session) =
        session_service::resolve_session(&state.pool, user.user_id, policy).await?;

    let recent = if is_new_session {
        Vec::new()
    } else {
        match session_service::recent_messages(&state.pool, session.id, CONTEXT_WINDOW).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(error = %err, session = %session.id, "failed to load recent messages");
                Vec::new()
            }
        }
    };

    let mut intents = intent::classify(&message);
    let last_assistant = recent
        .iter()
        .rev()
        .find(|m| m.role == ROLE_ASSISTANT)
        .map(|m| m.content.as_str());
    if intent::is_consultation_answer(&message, last_assistant) {
        intents.insert(Intent::ProductSearch);
    }

    let focus = focus::resolve_focus_product(&recent);
    let quantity = intent::extract_quantity(&message);

    let system_block = assemble_system_block(state, user.user_id, &intents, focus.as_ref(), quantity).await?;

    // Search before the AI call only when no system-action context is in
    // play; otherwise the system data owns the prompt and the search is
    // re-evaluated after the reply.
    let mut products: Vec<ProductRef> = Vec::new();
    let mut product_block: Option<String> = None;
    if intents.contains(Intent::ProductSearch) && system_block.is_none() {
        match search_products(state, &message, &intents, &recent).await {
            Ok(found) if !found.is_empty() => {
                product_block = Some(context::product_results_block(&found));
                products = found;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "catalog search failed, continuing without products");
            }
        }
    }

    let conversation_block = if payload.is_new_chat {
        None
    } else {
        context::conversation_block(&recent)
    };

    let prompt = context::build_prompt(
        system_block.as_deref(),
        product_block.as_deref(),
        conversation_block.as_deref(),
        &message,
    );

    let reply = state
        .replica
        .chat(
            &state.config.replica.replica_id,
            &user.user_id.to_string(),
            &prompt,
        )
        .await?;

    let action = state
        .interpreter
        .interpret(intents.system_action(), &reply.content);
    apply_action(state, user.user_id, action, focus.as_ref(), quantity).await;

    // The AI settled the turn without a cart mutation; a co-occurring
    // search intent still gets its products attached to the reply.
    if intents.contains(Intent::ProductSearch)
        && system_block.is_some()
        && action == Action::NoOp
        && products.is_empty()
    {
        match search_products(state, &message, &intents, &recent).await {
            Ok(found) => products = found,
            Err(err) => {
                tracing::warn!(error = %err, "post-reply catalog search failed");
            }
        }
    }

    let detected_link = intent::detect_link(&message);
    if let Err(err) = session_service::append_message(
        &state.pool,
        session.id,
        NewMessage {
            role: ROLE_USER,
            content: &message,
            detected_link,
            products: None,
            raw_response: None,
        },
    )
    .await
    {
        tracing::error!(error = %err, session = %session.id, "failed to persist user message");
    }

    let attached = (!products.is_empty()).then(|| products.clone());
    if let Err(err) = session_service::append_message(
        &state.pool,
        session.id,
        NewMessage {
            role: ROLE_ASSISTANT,
            content: &reply.content,
            detected_link: None,
            products: attached.as_deref(),
            raw_response: Some(reply.raw.clone()),
        },
    )
    .await
    {
        tracing::error!(error = %err, session = %session.id, "failed to persist assistant message");
    }

    if let Err(err) = session_service::touch_session(&state.pool, session.id).await {
        tracing::warn!(error = %err, session = %session.id, "failed to touch session");
    }

    Ok(ChatMessageResponse {
        success: true,
        message: reply.content,
        session_id: session.id,
        timestamp: Utc::now(),
        is_new_session,
        shopify_products: attached,
    })
}

/// Fetches whatever authoritative state the highest-priority system-action
/// intent needs and formats it for the prompt. Storage failures here are
/// fatal for the turn: answering a cart question without the cart would be
/// worse than failing.
async fn assemble_system_block(
    state: &AppState,
    user_id: Uuid,
    intents: &IntentSet,
    focus: Option<&ProductRef>,
    quantity: i32,
) -> AppResult<Option<String>> {
    let block = match intents.system_action() {
        Some(Intent::PurchaseIntent) => Some(context::purchase_block(focus, quantity)),
        Some(Intent::PurchaseHistoryQuery) => {
            let purchases =
                purchase_service::recent_purchases(&state.pool, user_id, HISTORY_LIMIT).await?;
            Some(context::history_block(&purchases))
        }
        Some(Intent::SpecificProductHistoryQuery) => {
            let matches = match focus {
                Some(product) => {
                    purchase_service::purchases_matching_name(&state.pool, user_id, &product.title)
                        .await?
                }
                None => Vec::new(),
            };
            Some(context::specific_history_block(focus, &matches))
        }
        Some(Intent::CartManagement) => {
            let items = cart_service::cart_items(&state.pool, user_id).await?;
            Some(context::cart_block(&items))
        }
        _ => None,
    };
    Ok(block)
}

/// Cart side-mutations degrade gracefully: a failed write is logged, the
/// turn still succeeds with the AI's reply.
async fn apply_action(
    state: &AppState,
    user_id: Uuid,
    action: Action,
    focus: Option<&ProductRef>,
    quantity: i32,
) {
    match action {
        Action::AddToCart => {
            let Some(product) = focus else {
                tracing::debug!("add signal without a focus product, nothing to add");
                return;
            };
            let product_url = state.config.shopify.product_url(&product.handle);
            match cart_service::add_product(&state.pool, user_id, product, quantity, product_url)
                .await
            {
                Ok(item) => {
                    tracing::info!(
                        user = %user_id,
                        product = %item.product_id,
                        quantity = item.quantity,
                        "reply confirmed cart add"
                    );
                    if let Err(err) = audit::record(
                        &state.pool,
                        user_id,
                        AuditAction::CartAddViaChat,
                        serde_json::json!({ "product_id": product.id, "quantity": quantity }),
                    )
                    .await
                    {
                        tracing::warn!(error = %err, "audit log failed");
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cart add failed after confirmed reply");
                }
            }
        }
        Action::RemoveMostRecentCartItem => {
            match cart_service::remove_most_recent(&state.pool, user_id).await {
                Ok(Some(item)) => {
                    tracing::info!(user = %user_id, product = %item.product_id, "reply confirmed cart removal");
                    if let Err(err) = audit::record(
                        &state.pool,
                        user_id,
                        AuditAction::CartRemoveViaChat,
                        serde_json::json!({ "product_id": item.product_id }),
                    )
                    .await
                    {
                        tracing::warn!(error = %err, "audit log failed");
                    }
                }
                Ok(None) => {
                    tracing::debug!(user = %user_id, "removal signal with an empty cart");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cart removal failed after confirmed reply");
                }
            }
        }
        Action::NoOp => {}
    }
}

/// Follow-up messages ("show me more") get the most recently shown product
/// title prepended so the catalog query has something to bite on.
async fn search_products(
    state: &AppState,
    message: &str,
    intents: &IntentSet,
    recent: &[ChatMessage],
) -> Result<Vec<ProductRef>, CatalogError> {
    let query = if intents.contains(Intent::FollowUp) {
        match focus::resolve_focus_product(recent) {
            Some(product) => format!("{} {}", product.title, message),
            None => message.to_string(),
        }
    } else {
        message.to_string()
    };
    state.catalog.search(&query, MAX_SEARCH_RESULTS).await
}
