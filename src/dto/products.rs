use serde::Serialize;
use utoipa::ToSchema;

use crate::models::ProductRef;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductRef>,
}
