use rust_decimal::Decimal;
use shoptalk_api::{db::create_pool, services::auth_service};
use uuid::Uuid;

// Demo data for local development: one shopper with a past order. Products
// live in the external catalog, so seeding targets users and purchase
// history only.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;

    let pool = create_pool(&database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "shopper@example.com", "shopper123").await?;
    seed_purchases(&pool, user_id).await?;

    println!("Seed completed. User ID: {user_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
    {
        println!("User {email} already present");
        return Ok(id);
    }

    let password_hash = auth_service::hash_password(password)?;
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Created user {email}");
    Ok(id)
}

async fn seed_purchases(pool: &sqlx::PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM purchases WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        println!("Purchases already seeded");
        return Ok(());
    }

    let order_id = Uuid::new_v4();
    let samples = [
        ("gid://shopify/Product/101", "Canvas Tote", Decimal::new(2500, 2), 1),
        ("gid://shopify/Product/102", "Enamel Mug", Decimal::new(1200, 2), 2),
        ("gid://shopify/Product/103", "Wool Beanie", Decimal::new(1800, 2), 1),
    ];

    for (product_id, name, price, quantity) in samples {
        let total = price * Decimal::from(quantity);
        sqlx::query(
            r#"
            INSERT INTO purchases
                (id, user_id, product_id, product_name, price, quantity, total, order_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(product_id)
        .bind(name)
        .bind(price)
        .bind(quantity)
        .bind(total)
        .bind(order_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded purchases");
    Ok(())
}
