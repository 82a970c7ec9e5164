use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CartItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertCartItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub product_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItem>,
    #[schema(value_type = String)]
    pub cart_total: Decimal,
}
