use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials body shared by register and login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT payload. `sub` carries the user id.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
