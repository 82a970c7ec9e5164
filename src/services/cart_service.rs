use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    db::DbPool,
    dto::cart::{CartList, UpsertCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, ProductRef},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_cart(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user.user_id)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let cart_total: Option<Decimal> =
        sqlx::query_scalar("SELECT SUM(total) FROM cart_items WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_one(pool)
            .await?;

    let data = CartList {
        items,
        cart_total: cart_total.unwrap_or(Decimal::ZERO),
    };
    Ok(ApiResponse::new("OK", data).with_meta(Meta::paged(
        pagination.page(),
        pagination.per_page(),
        count.0,
    )))
}

/// Direct cart edit from the storefront: sets the quantity outright.
pub async fn upsert_item(
    pool: &DbPool,
    user: &AuthUser,
    payload: UpsertCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let total = payload.price * Decimal::from(payload.quantity);
    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items
            (id, user_id, product_id, product_name, description, price, quantity, total,
             image_url, product_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, product_id) DO UPDATE
        SET product_name = EXCLUDED.product_name,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            quantity = EXCLUDED.quantity,
            total = EXCLUDED.total,
            image_url = EXCLUDED.image_url,
            product_url = EXCLUDED.product_url
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(&payload.product_id)
    .bind(&payload.product_name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.quantity)
    .bind(total)
    .bind(&payload.image_url)
    .bind(&payload.product_url)
    .fetch_one(pool)
    .await?;

    if let Err(err) = audit::record(
        pool,
        user.user_id,
        AuditAction::CartUpdate,
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::new("OK", item))
}

/// Chat-driven add: one atomic statement so concurrent adds of the same
/// product cannot lose updates. Re-adding increments the quantity and
/// recomputes the total from the stored unit price.
pub async fn add_product(
    pool: &DbPool,
    user_id: Uuid,
    product: &ProductRef,
    quantity: i32,
    product_url: String,
) -> AppResult<CartItem> {
    let total = product.price * Decimal::from(quantity);
    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items
            (id, user_id, product_id, product_name, description, price, quantity, total,
             image_url, product_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id, product_id) DO UPDATE
        SET quantity = cart_items.quantity + EXCLUDED.quantity,
            total = cart_items.price * (cart_items.quantity + EXCLUDED.quantity)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&product.id)
    .bind(&product.title)
    .bind(&product.description)
    .bind(product.price)
    .bind(quantity)
    .bind(total)
    .bind(&product.image_url)
    .bind(product_url)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn remove_item(
    pool: &DbPool,
    user: &AuthUser,
    product_id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = audit::record(
        pool,
        user.user_id,
        AuditAction::CartRemove,
        serde_json::json!({ "product_id": product_id }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::new("Removed from cart", serde_json::json!({})))
}

/// Removal policy for chat-driven removals: always the newest row.
pub async fn remove_most_recent(pool: &DbPool, user_id: Uuid) -> AppResult<Option<CartItem>> {
    let removed = sqlx::query_as::<_, CartItem>(
        r#"
        DELETE FROM cart_items
        WHERE id = (
            SELECT id FROM cart_items
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
        )
        RETURNING *
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(removed)
}

/// Full cart, oldest first, for context assembly.
pub async fn cart_items(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}
