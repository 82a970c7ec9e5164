pub mod auth;
pub mod cart;
pub mod chat;
pub mod products;
pub mod purchases;
