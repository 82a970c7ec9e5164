use rust_decimal::Decimal;

use crate::models::{CartItem, ChatMessage, ProductRef, Purchase, ROLE_ASSISTANT, ROLE_USER};

/// Purchase confirmation context. Tells the AI an automatic cart-add is
/// wired up, or asks it to get the product pinned down first.
pub fn purchase_block(focus: Option<&ProductRef>, quantity: i32) -> String {
    match focus {
        Some(product) => format!(
            "=== STORE DATA ===\n\
             PURCHASE REQUEST\n\
             The customer wants to buy: {title}\n\
             Requested quantity: {quantity}\n\
             Unit price: {price} {currency}\n\
             An automatic add-to-cart is available: if your reply confirms the purchase, \
             the item will be added to the customer's cart. Confirm warmly and say the \
             item was added to their cart.\n\
             === END STORE DATA ===",
            title = product.title,
            quantity = quantity,
            price = product.price,
            currency = product.currency,
        ),
        None => "=== STORE DATA ===\n\
             PURCHASE REQUEST\n\
             The customer wants to buy something, but no product is currently under \
             discussion.\n\
             Ask the customer to specify which product they mean before confirming \
             anything.\n\
             === END STORE DATA ==="
            .to_string(),
    }
}

/// Recent purchases, newest first, pre-limited by the caller.
pub fn history_block(purchases: &[Purchase]) -> String {
    if purchases.is_empty() {
        return "=== STORE DATA ===\n\
             PURCHASE HISTORY\n\
             The customer has not purchased anything yet.\n\
             Let them know their purchase history is empty and offer to help them find \
             something.\n\
             === END STORE DATA ==="
            .to_string();
    }

    let mut block = String::from("=== STORE DATA ===\nPURCHASE HISTORY (most recent first)\n");
    for purchase in purchases {
        block.push_str(&format!(
            "- {name} x{quantity} on {date} for {total}\n",
            name = purchase.product_name,
            quantity = purchase.quantity,
            date = purchase.purchase_date.format("%Y-%m-%d"),
            total = purchase.total,
        ));
    }
    block.push_str(
        "Use this data to answer the customer's question about their past purchases.\n\
         === END STORE DATA ===",
    );
    block
}

/// History filtered to the product under discussion, newest first.
pub fn specific_history_block(focus: Option<&ProductRef>, purchases: &[Purchase]) -> String {
    let Some(product) = focus else {
        return "=== STORE DATA ===\n\
             PRODUCT PURCHASE CHECK\n\
             The customer is asking about a specific product, but no product is \
             currently under discussion.\n\
             Ask the customer which product they mean.\n\
             === END STORE DATA ==="
            .to_string();
    };

    if purchases.is_empty() {
        return format!(
            "=== STORE DATA ===\n\
             PRODUCT PURCHASE CHECK\n\
             The customer has never purchased \"{title}\".\n\
             Tell them so and offer to add it to their cart if they are interested.\n\
             === END STORE DATA ===",
            title = product.title,
        );
    }

    let times = purchases.len();
    let total_quantity: i64 = purchases.iter().map(|p| p.quantity as i64).sum();
    let last = &purchases[0];

    format!(
        "=== STORE DATA ===\n\
         PRODUCT PURCHASE CHECK\n\
         Product: {title}\n\
         Times purchased: {times}\n\
         Total quantity: {total_quantity}\n\
         Last purchase: {date} (quantity {last_quantity})\n\
         Use this data to answer the customer's question about this product.\n\
         === END STORE DATA ===",
        title = product.title,
        times = times,
        total_quantity = total_quantity,
        date = last.purchase_date.format("%Y-%m-%d"),
        last_quantity = last.quantity,
    )
}

/// Current cart contents with the computed total.
pub fn cart_block(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "=== STORE DATA ===\n\
             SHOPPING CART\n\
             The customer's cart is empty.\n\
             Tell them so and offer to help them find something to add.\n\
             === END STORE DATA ==="
            .to_string();
    }

    let cart_total: Decimal = items.iter().map(|item| item.total).sum();
    let mut block = String::from("=== STORE DATA ===\nSHOPPING CART\n");
    for item in items {
        block.push_str(&format!(
            "- {name} x{quantity} at {price} each ({total})\n",
            name = item.product_name,
            quantity = item.quantity,
            price = item.price,
            total = item.total,
        ));
    }
    block.push_str(&format!("Cart total: {cart_total}\n"));
    block.push_str(
        "Answer the customer's cart question using this data. If your reply says an \
         item was removed, the most recently added item will be removed automatically.\n\
         === END STORE DATA ===",
    );
    block
}

/// Catalog matches formatted for the AI to weave into its reply.
pub fn product_results_block(products: &[ProductRef]) -> String {
    let mut block = String::from("=== MATCHING PRODUCTS ===\n");
    for (index, product) in products.iter().enumerate() {
        block.push_str(&format!(
            "{n}. {title} - {price} {currency}\n   {description}\n",
            n = index + 1,
            title = product.title,
            price = product.price,
            currency = product.currency,
            description = product.description,
        ));
    }
    block.push_str(
        "Present these products naturally in your reply and invite the customer to \
         pick one.\n\
         === END MATCHING PRODUCTS ===",
    );
    block
}

/// Last messages of the session, chronological. None when there is nothing
/// to show.
pub fn conversation_block(messages: &[ChatMessage]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }

    let mut block = String::from("=== CONVERSATION HISTORY ===\n");
    for message in messages {
        let role = match message.role.as_str() {
            ROLE_USER => "User",
            ROLE_ASSISTANT => "Assistant",
            other => other,
        };
        block.push_str(&format!("{role}: {content}\n", content = message.content));
    }
    block.push_str("=== END CONVERSATION HISTORY ===");
    Some(block)
}

pub fn build_prompt(
    system: Option<&str>,
    products: Option<&str>,
    conversation: Option<&str>,
    message: &str,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(block) = system {
        parts.push(block);
    }
    if let Some(block) = products {
        parts.push(block);
    }
    if let Some(block) = conversation {
        parts.push(block);
    }

    let tail = format!("Customer message: {message}");
    let mut prompt = parts.join("\n\n");
    if prompt.is_empty() {
        tail
    } else {
        prompt.push_str("\n\n");
        prompt.push_str(&tail);
        prompt
    }
}
