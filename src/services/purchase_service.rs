use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    db::DbPool,
    dto::purchases::{CheckoutResult, PurchaseList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Purchase},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_purchases(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<PurchaseList>> {
    let items = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = $1 ORDER BY purchase_date DESC LIMIT $2 OFFSET $3",
    )
    .bind(user.user_id)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM purchases WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    Ok(ApiResponse::new("OK", PurchaseList { items }).with_meta(Meta::paged(
        pagination.page(),
        pagination.per_page(),
        count.0,
    )))
}

/// Newest purchases first, for the purchase-history context block.
pub async fn recent_purchases(
    pool: &DbPool,
    user_id: Uuid,
    limit: i64,
) -> AppResult<Vec<Purchase>> {
    let purchases = sqlx::query_as::<_, Purchase>(
        "SELECT * FROM purchases WHERE user_id = $1 ORDER BY purchase_date DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(purchases)
}

/// Purchases whose product name contains `name`, case-insensitive, newest
/// first.
pub async fn purchases_matching_name(
    pool: &DbPool,
    user_id: Uuid,
    name: &str,
) -> AppResult<Vec<Purchase>> {
    let pattern = format!("%{name}%");
    let purchases = sqlx::query_as::<_, Purchase>(
        r#"
        SELECT * FROM purchases
        WHERE user_id = $1 AND product_name ILIKE $2
        ORDER BY purchase_date DESC
        "#,
    )
    .bind(user_id)
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(purchases)
}

/// Converts the cart into purchase records sharing one order id, inside a
/// transaction so a concurrent checkout cannot double-spend the cart.
pub async fn checkout(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CheckoutResult>> {
    let mut txn = pool.begin().await?;

    let items: Vec<CartItem> = sqlx::query_as(
        "SELECT * FROM cart_items WHERE user_id = $1 ORDER BY created_at ASC FOR UPDATE",
    )
    .bind(user.user_id)
    .fetch_all(&mut *txn)
    .await?;

    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let order_id = Uuid::new_v4();
    let mut purchases: Vec<Purchase> = Vec::new();
    let mut order_total = Decimal::ZERO;

    for item in &items {
        let purchase: Purchase = sqlx::query_as(
            r#"
            INSERT INTO purchases
                (id, user_id, product_id, product_name, price, quantity, total, order_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(item.total)
        .bind(order_id)
        .fetch_one(&mut *txn)
        .await?;

        order_total += purchase.total;
        purchases.push(purchase);
    }

    // clear cart
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = audit::record(
        pool,
        user.user_id,
        AuditAction::Checkout,
        serde_json::json!({ "order_id": order_id, "item_count": purchases.len() }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::new(
        "Checkout complete",
        CheckoutResult {
            order_id,
            items: purchases,
            order_total,
        },
    ))
}
