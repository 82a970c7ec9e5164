use crate::models::{ChatMessage, ProductRef, ROLE_ASSISTANT};

/// The product currently under discussion: the first product attached to
/// the most recent assistant message that carries one. `messages` is
/// chronological, as loaded from storage.
pub fn resolve_focus_product(messages: &[ChatMessage]) -> Option<ProductRef> {
    messages
        .iter()
        .rev()
        .find(|message| message.role == ROLE_ASSISTANT && !message.products().is_empty())
        .and_then(|message| message.products().first().cloned())
}
