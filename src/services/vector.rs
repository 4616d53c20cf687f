use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CandidatePayload, MemberProfile};

/// Errors that can occur when interacting with the vector index
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// One nearest-neighbor hit from the index
///
/// `score` is the raw cosine similarity reported by the retriever; `payload`
/// carries the candidate's structured attributes and display fields.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub member_id: String,
    pub score: f64,
    pub payload: CandidatePayload,
}

/// Qdrant REST client
///
/// Handles all communication with the vector index:
/// - Collection bootstrap at startup
/// - Upserting member vectors with their attribute payloads
/// - Nearest-neighbor search over stored embeddings
pub struct VectorStoreClient {
    base_url: String,
    api_key: Option<String>,
    collection: String,
    dimension: usize,
    client: Client,
}

impl VectorStoreClient {
    /// Create a new vector index client
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        collection: String,
        dimension: usize,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            collection,
            dimension,
            client,
        }
    }

    /// Deterministic point id for a member
    ///
    /// Qdrant only accepts unsigned integers or UUIDs as point ids, so the
    /// external string id is mapped to a UUIDv5 and kept authoritative in
    /// the payload.
    pub fn point_id(member_id: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, member_id.as_bytes())
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    /// Create the member collection if it does not exist yet
    ///
    /// Returns true when the collection was created by this call.
    pub async fn ensure_collection(&self) -> Result<bool, VectorStoreError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", self.collection),
            )
            .send()
            .await?;

        if response.status().is_success() {
            tracing::debug!("Collection {} already exists", self.collection);
            return Ok(false);
        }

        if response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(VectorStoreError::ApiError(format!(
                "Failed to inspect collection: {}",
                response.status()
            )));
        }

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}", self.collection),
            )
            .json(&json!({
                "vectors": {
                    "size": self.dimension,
                    "distance": "Cosine",
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VectorStoreError::ApiError(format!(
                "Failed to create collection: {}",
                response.status()
            )));
        }

        tracing::info!(
            "Created collection {} (dimension: {}, distance: cosine)",
            self.collection,
            self.dimension
        );

        Ok(true)
    }

    /// Store or refresh a member's vector and attribute payload
    ///
    /// Returns the point id the member was stored under.
    pub async fn upsert_member(
        &self,
        profile: &MemberProfile,
        embedding: &[f32],
    ) -> Result<String, VectorStoreError> {
        let point_id = Self::point_id(&profile.member_id).to_string();
        let payload = CandidatePayload::from(profile);

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", self.collection),
            )
            .json(&json!({
                "points": [{
                    "id": point_id,
                    "vector": embedding,
                    "payload": payload,
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VectorStoreError::ApiError(format!(
                "Failed to upsert member: {}",
                response.status()
            )));
        }

        tracing::debug!("Upserted member {} as point {}", profile.member_id, point_id);

        Ok(point_id)
    }

    /// Query the nearest neighbors to a vector, similarity descending
    pub async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", self.collection),
            )
            .json(&json!({
                "vector": vector,
                "limit": limit,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VectorStoreError::ApiError(format!(
                "Search failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let results = json
            .get("result")
            .and_then(|r| r.as_array())
            .ok_or_else(|| VectorStoreError::InvalidResponse("Missing result array".into()))?;

        let hits: Vec<SearchHit> = results.iter().filter_map(parse_hit).collect();

        tracing::debug!("Search returned {} of {} requested neighbors", hits.len(), limit);

        Ok(hits)
    }

    /// Collection status for health reporting ("green", "yellow", "red")
    pub async fn collection_status(&self) -> Result<String, VectorStoreError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", self.collection),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VectorStoreError::ApiError(format!(
                "Failed to fetch collection info: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        json.get("result")
            .and_then(|r| r.get("status"))
            .and_then(|s| s.as_str())
            .map(String::from)
            .ok_or_else(|| VectorStoreError::InvalidResponse("Missing collection status".into()))
    }
}

/// Extract a search hit from one result entry
///
/// A hit with a malformed or missing payload degrades to default attributes
/// (scoring treats those as "no bonus"); only a hit with no usable id or
/// score is dropped.
fn parse_hit(entry: &Value) -> Option<SearchHit> {
    let score = entry.get("score").and_then(|s| s.as_f64())?;

    let point_id = match entry.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let payload: CandidatePayload = entry
        .get("payload")
        .and_then(|p| serde_json::from_value(p.clone()).ok())
        .unwrap_or_default();

    let member_id = if payload.member_id.is_empty() {
        point_id
    } else {
        payload.member_id.clone()
    };

    Some(SearchHit {
        member_id,
        score,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_id_is_deterministic() {
        let a = VectorStoreClient::point_id("m_001");
        let b = VectorStoreClient::point_id("m_001");
        let c = VectorStoreClient::point_id("m_002");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_hit_with_full_payload() {
        let entry = json!({
            "id": "5ba1c0c4-8254-5534-a9b4-7cb0f05e0e67",
            "score": 0.87,
            "payload": {
                "memberId": "m_042",
                "name": "Carla Reyes",
                "company": "Altiplano Foods",
                "workArea": "Food",
                "offers": ["Distribution"],
            }
        });

        let hit = parse_hit(&entry).unwrap();

        assert_eq!(hit.member_id, "m_042");
        assert_eq!(hit.score, 0.87);
        assert_eq!(hit.payload.company, "Altiplano Foods");
        assert_eq!(hit.payload.work_area.as_deref(), Some("Food"));
    }

    #[test]
    fn test_parse_hit_without_payload_falls_back_to_point_id() {
        let entry = json!({ "id": 7, "score": 0.42 });

        let hit = parse_hit(&entry).unwrap();

        assert_eq!(hit.member_id, "7");
        assert_eq!(hit.payload.work_area, None);
        assert!(hit.payload.offers.is_empty());
    }

    #[test]
    fn test_parse_hit_drops_entry_without_score() {
        let entry = json!({ "id": "abc" });

        assert!(parse_hit(&entry).is_none());
    }
}
