use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Purchase;

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseList {
    pub items: Vec<Purchase>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResult {
    pub order_id: Uuid,
    pub items: Vec<Purchase>,
    #[schema(value_type = String)]
    pub order_total: Decimal,
}
