pub mod auth_service;
pub mod cart_service;
pub mod chat;
pub mod purchase_service;
pub mod session_service;
