use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::{MatchError, Matcher};
use crate::models::{
    ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, MemberProfile,
    UpsertMemberResponse,
};
use crate::services::{EmbeddingClient, VectorStoreClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub embeddings: Arc<EmbeddingClient>,
    pub vectors: Arc<VectorStoreClient>,
    pub default_limit: u16,
    pub max_limit: u16,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/members", web::post().to(upsert_member));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    // The vector index is the only dependency worth probing: the service is
    // useless without it, while the text backends degrade per request.
    let status = match state.vectors.collection_status().await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!("Health check: vector index unreachable: {}", e);
            "degraded"
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "profile": { "memberId": "string", "name": "string", ... },
///   "limit": 10
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let member_id = &req.profile.member_id;
    let limit = req.limit.unwrap_or(state.default_limit).min(state.max_limit) as usize;

    tracing::info!("Finding matches for member: {}, limit: {}", member_id, limit);

    match state.matcher.find_matches(&req.profile, limit).await {
        Ok(result) => {
            tracing::info!(
                "Returning {} matches for member {} (from {} candidates)",
                result.matches.len(),
                member_id,
                result.total_candidates
            );

            HttpResponse::Ok().json(FindMatchesResponse {
                matches: result.matches,
                total_candidates: result.total_candidates,
            })
        }
        Err(MatchError::EmbeddingUnavailable(e)) => {
            tracing::error!("Embedding unavailable for {}: {}", member_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Embedding unavailable".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
        Err(MatchError::RetrievalFailed(e)) => {
            tracing::error!("Candidate retrieval failed for {}: {}", member_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Candidate retrieval failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Upsert member endpoint
///
/// POST /api/v1/members
///
/// Embeds the profile (unless an embedding is already attached) and stores
/// it in the vector index so it becomes a candidate for other members.
async fn upsert_member(
    state: web::Data<AppState>,
    profile: web::Json<MemberProfile>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = profile.validate() {
        tracing::info!("Validation failed for upsert_member request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let embedding = match &profile.embedding {
        Some(vector) => {
            if vector.len() != state.embeddings.dimension() {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Invalid embedding".to_string(),
                    message: format!(
                        "Expected {} dimensions, got {}",
                        state.embeddings.dimension(),
                        vector.len()
                    ),
                    status_code: 400,
                });
            }
            vector.clone()
        }
        None => match state.embeddings.embed_profile(&profile).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::error!("Failed to embed profile {}: {}", profile.member_id, e);
                return HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Embedding unavailable".to_string(),
                    message: e.to_string(),
                    status_code: 500,
                });
            }
        },
    };

    match state.vectors.upsert_member(&profile, &embedding).await {
        Ok(point_id) => {
            tracing::info!("Upserted member {} as point {}", profile.member_id, point_id);
            HttpResponse::Ok().json(UpsertMemberResponse {
                success: true,
                member_id: profile.member_id.clone(),
                point_id,
            })
        }
        Err(e) => {
            tracing::error!("Failed to store member {}: {}", profile.member_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to store member".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
