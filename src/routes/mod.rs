use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod chat;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod purchases;

// Build the API router without binding state; it is provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/chat", chat::router())
        .nest("/cart", cart::router())
        .nest("/purchases", purchases::router())
        .nest("/products", products::router())
}
