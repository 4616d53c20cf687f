// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{MemberProfile, CandidatePayload, MatchCategory, ScoredMatch, ScoringWeights};
pub use requests::FindMatchesRequest;
pub use responses::{FindMatchesResponse, UpsertMemberResponse, HealthResponse, ErrorResponse};
