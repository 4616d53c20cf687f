use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::models::{CandidatePayload, MemberProfile};

/// Maximum reasons attached to a match
const MAX_REASONS: usize = 3;

/// Scripted reasons used whenever the text generator cannot be reached or
/// answers with nothing usable
const FALLBACK_REASONS: [&str; MAX_REASONS] = [
    "Complementary profiles",
    "Potential collaboration",
    "Strategic synergy",
];

/// Errors internal to the reason generator
///
/// These never escape [`ReasonEngine::generate_reasons`]; they exist so the
/// failure can be logged with its cause before the fallback kicks in.
#[derive(Debug, Error)]
pub enum ReasonError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Azure OpenAI chat-completions client for pairing explanations
///
/// Produces up to three short justifications for why two members should
/// connect, derived from the source's needs and the candidate's offers. A
/// failing or empty upstream answer is replaced by a fixed fallback set, so
/// reason generation can never fail a ranking request.
pub struct ReasonEngine {
    endpoint: String,
    api_key: String,
    api_version: String,
    deployment: String,
    max_tokens: u32,
    client: Client,
}

impl ReasonEngine {
    /// Create a new reason engine
    pub fn new(
        endpoint: String,
        api_key: String,
        api_version: String,
        deployment: String,
        max_tokens: u32,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            api_key,
            api_version,
            deployment,
            max_tokens,
            client,
        }
    }

    /// Generate up to three short reasons for a pairing
    ///
    /// Infallible by contract: any transport, API, or parse failure - and an
    /// answer with no usable lines - degrades to the scripted fallback of
    /// exactly three reasons.
    pub async fn generate_reasons(
        &self,
        source: &MemberProfile,
        candidate: &CandidatePayload,
    ) -> Vec<String> {
        match self.request_reasons(source, candidate).await {
            Ok(reasons) if !reasons.is_empty() => reasons,
            Ok(_) => {
                tracing::warn!(
                    "Reason generator returned no usable lines for {} -> {}, using fallback",
                    source.member_id,
                    candidate.member_id
                );
                fallback_reasons()
            }
            Err(e) => {
                tracing::warn!(
                    "Reason generation failed for {} -> {}: {}, using fallback",
                    source.member_id,
                    candidate.member_id,
                    e
                );
                fallback_reasons()
            }
        }
    }

    async fn request_reasons(
        &self,
        source: &MemberProfile,
        candidate: &CandidatePayload,
    ) -> Result<Vec<String>, ReasonError> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        );

        let prompt = build_prompt(source, candidate);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&json!({
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ReasonError::ApiError(format!(
                "Completion request failed: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let content = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| ReasonError::InvalidResponse("Missing completion content".into()))?;

        Ok(parse_reasons(content))
    }
}

/// The fixed degraded-mode reasons: always exactly three non-empty strings
pub fn fallback_reasons() -> Vec<String> {
    FALLBACK_REASONS.iter().map(|r| r.to_string()).collect()
}

/// Prompt asking for one short reason per line, no numbering
fn build_prompt(source: &MemberProfile, candidate: &CandidatePayload) -> String {
    format!(
        "Explain in 3 brief reasons (max 12 words each) why these entrepreneurs should connect:\n\n\
         1: {} - {} - Needs: {}\n\
         2: {} - {} - Offers: {}\n\n\
         Format: one reason per line, no numbering.",
        source.name,
        source.work_area,
        source.needs.join(", "),
        candidate.name,
        candidate.work_area.as_deref().unwrap_or(""),
        candidate.offers.join(", "),
    )
}

/// Split a completion into reasons: trim lines, drop empties, keep at most
/// three. Fewer than three surviving lines are returned as-is.
fn parse_reasons(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_REASONS)
        .map(String::from)
        .collect()
}
