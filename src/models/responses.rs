use serde::{Deserialize, Serialize};
use crate::models::domain::ScoredMatch;

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Response for member upsert endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertMemberResponse {
    pub success: bool,
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "pointId")]
    pub point_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
