use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ReplicaConfig;

#[derive(Debug, Error)]
pub enum ReplicaError {
    #[error("replica request timed out")]
    Timeout,

    #[error("replica rejected the credentials")]
    Unauthorized,

    #[error("replica rate limit exceeded")]
    RateLimited,

    #[error("replica request failed: {0}")]
    Network(String),
}

/// The AI's free-text reply plus the raw payload, kept for audit.
#[derive(Debug, Clone)]
pub struct ReplicaReply {
    pub content: String,
    pub raw: Value,
}

/// The AI persona service the orchestrator talks to once per turn.
#[async_trait]
pub trait AiReplica: Send + Sync {
    async fn chat(
        &self,
        replica_id: &str,
        external_user_id: &str,
        prompt: &str,
    ) -> Result<ReplicaReply, ReplicaError>;
}

#[derive(Debug, Clone)]
pub struct ReplicaClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    content: &'a str,
    source: &'a str,
    skip_chat_history: bool,
}

impl ReplicaClient {
    pub fn new(config: &ReplicaConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl AiReplica for ReplicaClient {
    async fn chat(
        &self,
        replica_id: &str,
        external_user_id: &str,
        prompt: &str,
    ) -> Result<ReplicaReply, ReplicaError> {
        let url = format!(
            "{}/v1/replicas/{}/chat/completions",
            self.base_url, replica_id
        );

        let response = self
            .client
            .post(&url)
            .header("X-ORGANIZATION-SECRET", &self.api_key)
            .header("X-USER-ID", external_user_id)
            .timeout(self.timeout)
            .json(&CompletionRequest {
                content: prompt,
                source: "web",
                skip_chat_history: false,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReplicaError::Timeout
                } else {
                    ReplicaError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ReplicaError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ReplicaError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "replica call failed");
            return Err(ReplicaError::Network(format!("replica returned {status}")));
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ReplicaError::Network(format!("unreadable replica payload: {e}")))?;

        let content = raw
            .get("content")
            .and_then(|c| c.as_str())
            .unwrap_or_default()
            .to_string();

        if content.is_empty() {
            return Err(ReplicaError::Network("replica reply had no content".into()));
        }

        Ok(ReplicaReply { content, raw })
    }
}
