use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthRequest, LoginResponse, TokenClaims},
        cart::{CartList, UpsertCartItemRequest},
        chat::{ChatMessageRequest, ChatMessageResponse, SessionHistory, SessionList, SessionSummary},
        products::ProductList,
        purchases::{CheckoutResult, PurchaseList},
    },
    models::{CartItem, ChatMessage, ChatSession, ProductRef, Purchase, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, chat, health, params, products, purchases},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        chat::send_message,
        chat::list_sessions,
        chat::session_history,
        cart::cart_list,
        cart::upsert_cart_item,
        cart::remove_from_cart,
        purchases::list_purchases,
        purchases::checkout,
        products::search_products,
        products::product_detail
    ),
    components(
        schemas(
            User,
            ProductRef,
            ChatSession,
            ChatMessage,
            CartItem,
            Purchase,
            AuthRequest,
            LoginResponse,
            TokenClaims,
            ChatMessageRequest,
            ChatMessageResponse,
            SessionSummary,
            SessionList,
            SessionHistory,
            UpsertCartItemRequest,
            CartList,
            PurchaseList,
            CheckoutResult,
            ProductList,
            params::Pagination,
            params::ProductSearchQuery,
            Meta,
            ApiResponse<CartList>,
            ApiResponse<ProductRef>,
            ApiResponse<PurchaseList>,
            ApiResponse<CheckoutResult>,
            ApiResponse<ProductList>,
            ApiResponse<SessionList>,
            ApiResponse<SessionHistory>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Auth", description = "Registration and token issuance"),
        (name = "Chat", description = "Conversational shopping assistant"),
        (name = "Cart", description = "Shopping cart management"),
        (name = "Purchases", description = "Purchase history and checkout"),
        (name = "Products", description = "Catalog search proxy"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
