use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{catalog::CatalogError, replica::ReplicaError, response::ApiResponse};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error(transparent)]
    Replica(#[from] ReplicaError),

    #[error("Catalog error")]
    Catalog(#[from] CatalogError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The string shown to the end user. Upstream replica failures get a
    /// kind-specific apology instead of the raw error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Replica(ReplicaError::Timeout) => {
                "The assistant is taking too long to respond. Please try again in a moment."
                    .to_string()
            }
            AppError::Replica(ReplicaError::Unauthorized) => {
                "Your assistant session has expired. Please try logging out and back in."
                    .to_string()
            }
            AppError::Replica(ReplicaError::RateLimited) => {
                "Too many requests right now. Please wait a few seconds and try again."
                    .to_string()
            }
            AppError::Replica(ReplicaError::Network(_)) => {
                "Sorry, something went wrong while reaching the assistant. Please try again."
                    .to_string()
            }
            AppError::Catalog(_) => "Product search is unavailable right now.".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::DbError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Replica(ReplicaError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Replica(ReplicaError::Unauthorized) => StatusCode::UNAUTHORIZED,
            AppError::Replica(ReplicaError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Replica(ReplicaError::Network(_)) => StatusCode::BAD_GATEWAY,
            AppError::Catalog(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ApiResponse {
            message: self.user_message(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: None,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
