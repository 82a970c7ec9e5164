use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    db::DbPool,
    dto::auth::{AuthRequest, LoginResponse, TokenClaims},
    error::{AppError, AppResult},
    models::User,
    response::ApiResponse,
};

const TOKEN_LIFETIME_HOURS: i64 = 24;

pub fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("stored password hash is malformed")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn register(pool: &DbPool, payload: AuthRequest) -> AppResult<ApiResponse<User>> {
    let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::BadRequest("email is already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    if let Err(err) = audit::record(
        pool,
        user.id,
        AuditAction::UserRegister,
        serde_json::json!({ "email": user.email }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::new("User created", user))
}

pub async fn login(pool: &DbPool, payload: AuthRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(pool)
        .await?;

    // Same rejection for unknown email and wrong password.
    let user = user.ok_or_else(|| AppError::BadRequest("invalid email or password".into()))?;
    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::BadRequest("invalid email or password".into()));
    }

    let expires_at = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let token = issue_token(&user, expires_at)?;

    if let Err(err) = audit::record(
        pool,
        user.id,
        AuditAction::UserLogin,
        serde_json::json!({ "email": user.email }),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::new(
        "Logged in",
        LoginResponse { token, expires_at },
    ))
}

fn issue_token(user: &User, expires_at: DateTime<Utc>) -> AppResult<String> {
    let claims = TokenClaims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expires_at.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret()?.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
}
