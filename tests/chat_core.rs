use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use shoptalk_api::dto::chat::ChatMessageResponse;
use shoptalk_api::models::{ChatMessage, ProductRef, Purchase, ROLE_ASSISTANT, ROLE_USER};
use shoptalk_api::services::chat::context;
use shoptalk_api::services::chat::focus::resolve_focus_product;
use shoptalk_api::services::chat::intent::{
    Intent, classify, detect_link, extract_quantity, is_consultation_answer,
};
use shoptalk_api::services::chat::interpret::{Action, LexicalInterpreter, ReplyInterpreter};

fn product(id: &str, title: &str, price_cents: i64) -> ProductRef {
    ProductRef {
        id: id.to_string(),
        handle: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        description: format!("{title} description"),
        price: Decimal::new(price_cents, 2),
        currency: "USD".to_string(),
        image_url: None,
    }
}

fn message(role: &str, content: &str, products: Option<Vec<ProductRef>>) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        role: role.to_string(),
        content: content.to_string(),
        detected_link: None,
        attached_products: products.map(Json),
        raw_ai_response: None,
        created_at: Utc::now(),
    }
}

fn purchase(name: &str, quantity: i32, price_cents: i64) -> Purchase {
    let price = Decimal::new(price_cents, 2);
    Purchase {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        product_id: "gid://shopify/Product/1".to_string(),
        product_name: name.to_string(),
        price,
        quantity,
        total: price * Decimal::from(quantity),
        order_id: Uuid::new_v4(),
        purchase_date: Utc::now(),
        status: "completed".to_string(),
    }
}

#[test]
fn no_keyword_message_is_plain_chat() {
    let intents = classify("nice weather today");
    assert!(intents.is_plain_chat());
    assert!(intents.system_action().is_none());
}

#[test]
fn history_phrase_sets_history_intent() {
    let intents = classify("What did I buy last month?");
    assert!(intents.contains(Intent::PurchaseHistoryQuery));
    assert_eq!(intents.system_action(), Some(Intent::PurchaseHistoryQuery));
}

#[test]
fn specific_history_phrase_sets_specific_intent() {
    let intents = classify("have i bought this before?");
    assert!(intents.contains(Intent::SpecificProductHistoryQuery));
}

#[test]
fn purchase_phrase_wins_priority_over_cart_phrase() {
    // "add it to my cart" matches both the purchase and cart tables; the
    // purchase intent takes precedence for context assembly.
    let intents = classify("please add it to my cart");
    assert!(intents.contains(Intent::PurchaseIntent));
    assert!(intents.contains(Intent::CartManagement));
    assert_eq!(intents.system_action(), Some(Intent::PurchaseIntent));
}

#[test]
fn follow_up_phrase_sets_search_and_follow_up() {
    let intents = classify("show me more options please");
    assert!(intents.contains(Intent::FollowUp));
    assert!(intents.contains(Intent::ProductSearch));
    assert!(!intents.is_plain_chat());
}

#[test]
fn consultation_answer_requires_question_and_short_reply() {
    assert!(is_consultation_answer("blue", Some("What color do you prefer?")));
    assert!(!is_consultation_answer("blue", Some("Here are some shirts.")));
    assert!(!is_consultation_answer("blue", None));
    assert!(!is_consultation_answer(
        "well it depends on a lot of things I have not decided yet honestly",
        Some("What color do you prefer?")
    ));
}

#[test]
fn quantity_extraction_defaults_to_one() {
    assert_eq!(extract_quantity("add 3 pieces to cart"), 3);
    assert_eq!(extract_quantity("add to cart"), 1);
    assert_eq!(extract_quantity("give me 12 of those"), 12);
}

#[test]
fn link_detection_finds_first_url() {
    assert_eq!(
        detect_link("look at https://example.com/item please"),
        Some("https://example.com/item".to_string())
    );
    assert_eq!(detect_link("no link here"), None);
}

#[test]
fn focus_product_comes_from_most_recent_assistant_message() {
    let messages = vec![
        message(ROLE_ASSISTANT, "older", Some(vec![product("p0", "Old Hat", 500)])),
        message(ROLE_USER, "ok", None),
        message(ROLE_ASSISTANT, "newer", Some(vec![product("p1", "Tee", 2000)])),
        message(ROLE_USER, "yes", None),
        message(ROLE_ASSISTANT, "no products here", None),
    ];

    let focus = resolve_focus_product(&messages).expect("focus product");
    assert_eq!(focus.id, "p1");
}

#[test]
fn focus_product_none_without_attachments() {
    let messages = vec![
        message(ROLE_USER, "hello", None),
        message(ROLE_ASSISTANT, "hi there", None),
    ];
    assert!(resolve_focus_product(&messages).is_none());
}

#[test]
fn purchase_block_without_focus_asks_to_specify() {
    let block = context::purchase_block(None, 1);
    assert!(block.contains("Ask the customer to specify"));
}

#[test]
fn purchase_block_with_focus_names_product_and_quantity() {
    let p = product("p1", "Tee", 2000);
    let block = context::purchase_block(Some(&p), 3);
    assert!(block.contains("Tee"));
    assert!(block.contains("Requested quantity: 3"));
    assert!(block.contains("automatic add-to-cart"));
}

#[test]
fn history_block_lists_records_and_handles_empty() {
    let purchases = vec![purchase("Mug", 2, 1200), purchase("Tote", 1, 2500)];
    let block = context::history_block(&purchases);
    assert!(block.contains("Mug x2"));
    assert!(block.contains("Tote x1"));

    let empty = context::history_block(&[]);
    assert!(empty.contains("has not purchased anything"));
}

#[test]
fn specific_history_block_reports_totals() {
    let p = product("p1", "Mug", 1200);
    let purchases = vec![purchase("Mug", 2, 1200), purchase("Mug", 1, 1200)];
    let block = context::specific_history_block(Some(&p), &purchases);
    assert!(block.contains("Times purchased: 2"));
    assert!(block.contains("Total quantity: 3"));

    let never = context::specific_history_block(Some(&p), &[]);
    assert!(never.contains("never purchased"));
}

#[test]
fn cart_block_computes_total_and_handles_empty() {
    let empty = context::cart_block(&[]);
    assert!(empty.contains("cart is empty"));
}

#[test]
fn conversation_block_is_omitted_when_empty() {
    assert!(context::conversation_block(&[]).is_none());

    let messages = vec![
        message(ROLE_USER, "hi", None),
        message(ROLE_ASSISTANT, "hello!", None),
    ];
    let block = context::conversation_block(&messages).expect("block");
    assert!(block.contains("User: hi"));
    assert!(block.contains("Assistant: hello!"));
}

#[test]
fn plain_chat_prompt_is_just_the_message() {
    let prompt = context::build_prompt(None, None, None, "hello there");
    assert_eq!(prompt, "Customer message: hello there");
}

#[test]
fn interpreter_confirms_add_on_cart_confirmation() {
    let interpreter = LexicalInterpreter;
    assert_eq!(
        interpreter.interpret(Some(Intent::PurchaseIntent), "I've added it to your cart!"),
        Action::AddToCart
    );
    assert_eq!(
        interpreter.interpret(Some(Intent::PurchaseIntent), "Done \u{2705}"),
        Action::AddToCart
    );
    assert_eq!(
        interpreter.interpret(
            Some(Intent::PurchaseIntent),
            "Which product did you mean exactly?"
        ),
        Action::NoOp
    );
}

#[test]
fn interpreter_confirms_removal_only_for_cart_management() {
    let interpreter = LexicalInterpreter;
    assert_eq!(
        interpreter.interpret(
            Some(Intent::CartManagement),
            "I have removed the beanie from your cart."
        ),
        Action::RemoveMostRecentCartItem
    );
    assert_eq!(
        interpreter.interpret(Some(Intent::PlainChat), "removed"),
        Action::NoOp
    );
    assert_eq!(interpreter.interpret(None, "removed"), Action::NoOp);
}

#[test]
fn chat_response_serializes_camel_case_and_omits_empty_products() {
    let resp = ChatMessageResponse {
        success: true,
        message: "hello".into(),
        session_id: Uuid::nil(),
        timestamp: Utc::now(),
        is_new_session: true,
        shopify_products: None,
    };

    let value = serde_json::to_value(&resp).unwrap();
    assert_eq!(value["success"], true);
    assert_eq!(value["isNewSession"], true);
    assert!(value.get("sessionId").is_some());
    assert!(value.get("timestamp").is_some());
    assert!(value.get("shopifyProducts").is_none());
}

#[test]
fn product_refs_serialize_camel_case() {
    let mut p = product("gid://shopify/Product/1", "Tee", 2000);
    p.image_url = Some("https://cdn.example/tee.png".into());

    let value = serde_json::to_value(&p).unwrap();
    assert_eq!(value["imageUrl"], "https://cdn.example/tee.png");
    assert_eq!(value["price"], "20.00");
    assert_eq!(value["currency"], "USD");
}
