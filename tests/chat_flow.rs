use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use shoptalk_api::{
    catalog::{Catalog, CatalogError},
    config::{AppConfig, ReplicaConfig, ShopifyConfig},
    db::create_pool,
    dto::chat::ChatMessageRequest,
    error::AppError,
    middleware::auth::AuthUser,
    models::{ProductRef, ROLE_ASSISTANT},
    replica::{AiReplica, ReplicaError, ReplicaReply},
    services::{
        cart_service, chat, purchase_service, session_service,
        session_service::NewMessage,
    },
    state::AppState,
};

// Replica stub that records every prompt and answers with a scripted reply.
struct ScriptedReplica {
    reply: Mutex<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReplica {
    fn new(reply: &str) -> Self {
        Self {
            reply: Mutex::new(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_string();
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl AiReplica for ScriptedReplica {
    async fn chat(
        &self,
        _replica_id: &str,
        _external_user_id: &str,
        prompt: &str,
    ) -> Result<ReplicaReply, ReplicaError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let content = self.reply.lock().unwrap().clone();
        let raw = serde_json::json!({ "content": content.clone() });
        Ok(ReplicaReply { content, raw })
    }
}

struct TimeoutReplica;

#[async_trait]
impl AiReplica for TimeoutReplica {
    async fn chat(
        &self,
        _replica_id: &str,
        _external_user_id: &str,
        _prompt: &str,
    ) -> Result<ReplicaReply, ReplicaError> {
        Err(ReplicaError::Timeout)
    }
}

struct StaticCatalog {
    products: Vec<ProductRef>,
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<ProductRef>, CatalogError> {
        Ok(self.products.iter().take(limit).cloned().collect())
    }

    async fn product_by_handle(&self, handle: &str) -> Result<Option<ProductRef>, CatalogError> {
        Ok(self.products.iter().find(|p| p.handle == handle).cloned())
    }
}

fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        replica: ReplicaConfig {
            base_url: "http://localhost:9".to_string(),
            api_key: "test-key".to_string(),
            replica_id: "replica-test".to_string(),
            timeout_secs: 5,
        },
        shopify: ShopifyConfig {
            store_domain: "test-store.myshopify.com".to_string(),
            storefront_token: "test-token".to_string(),
            api_version: "2024-01".to_string(),
        },
    }
}

// Allow skipping when no DB is configured in the environment.
async fn setup(
    replica: Arc<dyn AiReplica>,
    catalog: Arc<dyn Catalog>,
) -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run chat flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(Some(AppState::new(
        pool,
        test_config(&database_url),
        replica,
        catalog,
    )))
}

async fn create_user(state: &AppState) -> anyhow::Result<AuthUser> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash) VALUES ($1, $2, 'dummy')")
        .bind(id)
        .bind(format!("user-{id}@example.com"))
        .execute(&state.pool)
        .await?;
    Ok(AuthUser {
        user_id: id,
        role: "user".to_string(),
    })
}

fn req(message: &str, is_new_chat: bool, session_id: Option<Uuid>) -> ChatMessageRequest {
    ChatMessageRequest {
        message: message.to_string(),
        is_new_chat,
        session_id,
    }
}

fn tee() -> ProductRef {
    ProductRef {
        id: "p1".to_string(),
        handle: "tee".to_string(),
        title: "Tee".to_string(),
        description: "Soft cotton tee".to_string(),
        price: Decimal::new(2000, 2),
        currency: "USD".to_string(),
        image_url: None,
    }
}

// Full chat turn flow: session resolution, context assembly, reply
// interpretation, cart mutation, persistence.
#[tokio::test]
async fn chat_turn_flow() -> anyhow::Result<()> {
    let replica = Arc::new(ScriptedReplica::new("Hi, how can I help?"));
    let catalog = Arc::new(StaticCatalog {
        products: vec![tee()],
    });
    let Some(state) = setup(replica.clone(), catalog).await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;

    // Empty messages are rejected before any collaborator is called.
    let err = chat::handle_chat_message(&state, &user, req("   ", true, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // New chats always get a fresh session.
    let first = chat::handle_chat_message(&state, &user, req("hello there", true, None)).await?;
    assert!(first.success);
    assert!(first.is_new_session);
    let second = chat::handle_chat_message(&state, &user, req("hello again", true, None)).await?;
    assert!(second.is_new_session);
    assert_ne!(first.session_id, second.session_id);

    // A stale session id self-heals to a fresh session.
    let healed =
        chat::handle_chat_message(&state, &user, req("hi", false, Some(Uuid::new_v4()))).await?;
    assert!(healed.is_new_session);

    // Purchase intent with nothing on display: the context tells the AI to
    // ask, both turns persist, the cart stays empty.
    replica.set_reply("Could you tell me which product you mean?");
    let resp =
        chat::handle_chat_message(&state, &user, req("I want to buy this", true, None)).await?;
    assert!(resp.success);
    assert!(replica.last_prompt().contains("Ask the customer to specify"));
    let cart = cart_service::cart_items(&state.pool, user.user_id).await?;
    assert!(cart.is_empty());
    let turns = session_service::recent_messages(&state.pool, resp.session_id, 10).await?;
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "I want to buy this");

    // Seed a session whose last assistant message carries a product.
    let session = session_service::create_session(&state.pool, user.user_id).await?;
    let shown = tee();
    session_service::append_message(
        &state.pool,
        session.id,
        NewMessage {
            role: ROLE_ASSISTANT,
            content: "How about this tee?",
            detected_link: None,
            products: Some(std::slice::from_ref(&shown)),
            raw_response: None,
        },
    )
    .await?;

    // Round-trip: the stored attachment reads back exactly as written.
    let stored = session_service::recent_messages(&state.pool, session.id, 10).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].role, ROLE_ASSISTANT);
    assert_eq!(stored[0].products(), std::slice::from_ref(&shown));

    // Confirmed purchase: reply signals the add, the focus product lands in
    // the cart with quantity 1 and total = unit price.
    replica.set_reply("Great choice! I've added it to your cart.");
    let resp = chat::handle_chat_message(
        &state,
        &user,
        req("yes add it to my cart", false, Some(session.id)),
    )
    .await?;
    assert!(!resp.is_new_session);
    let cart = cart_service::cart_items(&state.pool, user.user_id).await?;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 1);
    assert_eq!(cart[0].total, Decimal::new(2000, 2));

    // Re-adding increments the quantity and keeps total = price * quantity.
    let item = cart_service::add_product(
        &state.pool,
        user.user_id,
        &shown,
        1,
        "https://test-store.myshopify.com/products/tee".to_string(),
    )
    .await?;
    assert_eq!(item.quantity, 2);
    assert_eq!(item.total, Decimal::new(4000, 2));

    // Checkout converts the cart into purchases sharing one order id.
    let checkout = purchase_service::checkout(&state.pool, &user).await?;
    let result = checkout.data.unwrap();
    assert_eq!(result.order_total, Decimal::new(4000, 2));
    assert!(result.items.iter().all(|p| p.order_id == result.order_id));
    let cart = cart_service::cart_items(&state.pool, user.user_id).await?;
    assert!(cart.is_empty());

    // Purchase-history question: the history block reaches the prompt.
    replica.set_reply("You bought a Tee recently!");
    chat::handle_chat_message(
        &state,
        &user,
        req("what did i buy recently?", false, Some(session.id)),
    )
    .await?;
    let prompt = replica.last_prompt();
    assert!(prompt.contains("PURCHASE HISTORY"));
    assert!(prompt.contains("Tee x2"));

    // Product search: catalog matches are attached to the reply and shown
    // to the AI.
    replica.set_reply("Here are some tees you might like.");
    let resp = chat::handle_chat_message(&state, &user, req("show me some tees", true, None)).await?;
    let products = resp.shopify_products.expect("products attached");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "p1");
    assert!(replica.last_prompt().contains("MATCHING PRODUCTS"));

    Ok(())
}

// A replica failure aborts the turn: kind-specific apology, nothing
// persisted for the failed turn.
#[tokio::test]
async fn replica_failure_aborts_turn_without_persisting() -> anyhow::Result<()> {
    let catalog = Arc::new(StaticCatalog { products: vec![] });
    let Some(state) = setup(Arc::new(TimeoutReplica), catalog).await? else {
        return Ok(());
    };
    let user = create_user(&state).await?;
    let session = session_service::create_session(&state.pool, user.user_id).await?;

    let err = chat::handle_chat_message(&state, &user, req("hello", false, Some(session.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Replica(ReplicaError::Timeout)));
    assert!(err.user_message().contains("taking too long"));

    let messages = session_service::recent_messages(&state.pool, session.id, 10).await?;
    assert!(messages.is_empty());
    Ok(())
}
