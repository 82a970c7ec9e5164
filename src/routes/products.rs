use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::ProductRef,
    response::ApiResponse,
    routes::params::ProductSearchQuery,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_products))
        .route("/{handle}", get(product_detail))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("q" = String, Query, description = "Search terms"),
        ("limit" = Option<i64>, Query, description = "Max results, default 5"),
    ),
    responses(
        (status = 200, description = "Catalog matches", body = ApiResponse<ProductList>),
        (status = 502, description = "Catalog unavailable"),
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let limit = query.limit.unwrap_or(5).clamp(1, 20) as usize;
    let items = state.catalog.search(&query.q, limit).await?;

    Ok(Json(ApiResponse::new("Products", ProductList { items })))
}

#[utoipa::path(
    get,
    path = "/api/products/{handle}",
    params(
        ("handle" = String, Path, description = "Catalog product handle")
    ),
    responses(
        (status = 200, description = "Product detail", body = ApiResponse<ProductRef>),
        (status = 404, description = "No product with this handle"),
        (status = 502, description = "Catalog unavailable"),
    ),
    tag = "Products"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> AppResult<Json<ApiResponse<ProductRef>>> {
    let product = state
        .catalog
        .product_by_handle(&handle)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ApiResponse::new("Product", product)))
}
