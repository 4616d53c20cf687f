use moka::future::Cache;
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

use crate::models::MemberProfile;

/// Errors that can occur when requesting embeddings
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}

/// Azure OpenAI embeddings client
///
/// Turns a member profile's canonical text into a fixed-dimension semantic
/// vector. Responses are cached in-process keyed by a SHA-256 of the input
/// text, which makes recomputation idempotent: concurrent first-time
/// embedding of the same profile costs at most one redundant upstream call
/// and no shared mutation.
pub struct EmbeddingClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment: String,
    dimension: usize,
    client: Client,
    cache: Cache<String, Vec<f32>>,
}

impl EmbeddingClient {
    /// Create a new embeddings client
    pub fn new(
        endpoint: String,
        api_key: String,
        api_version: String,
        deployment: String,
        dimension: usize,
        cache_size: u64,
        cache_ttl_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(Duration::from_secs(cache_ttl_secs))
            .build();

        Self {
            endpoint,
            api_key,
            api_version,
            deployment,
            dimension,
            client,
            cache,
        }
    }

    /// Embed a member profile's canonical text
    pub async fn embed_profile(&self, profile: &MemberProfile) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_text(&profile.embedding_text()).await
    }

    /// Embed arbitrary text, consulting the in-process cache first
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = content_key(text);

        if let Some(vector) = self.cache.get(&key).await {
            tracing::trace!("Embed cache hit: {}", key);
            return Ok(vector);
        }

        let vector = self.request_embedding(text).await?;
        self.cache.insert(key, vector.clone()).await;

        Ok(vector)
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        );

        tracing::debug!("Requesting embedding for {} chars of text", text.len());

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&json!({ "input": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::ApiError(format!(
                "Embedding request failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let values = json
            .get("data")
            .and_then(|d| d.as_array())
            .and_then(|d| d.first())
            .and_then(|e| e.get("embedding"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| EmbeddingError::InvalidResponse("Missing embedding data".into()))?;

        let vector: Vec<f32> = values
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbeddingError::InvalidResponse("Non-numeric component".into()))
            })
            .collect::<Result<_, _>>()?;

        if vector.len() != self.dimension {
            return Err(EmbeddingError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        tracing::debug!("Generated embedding: dimension={}", vector.len());

        Ok(vector)
    }

    /// Expected embedding dimensionality
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cache key for an embedding input: hex SHA-256 of the text
fn content_key(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
