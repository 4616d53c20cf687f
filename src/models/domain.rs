use serde::{Deserialize, Serialize};
use validator::Validate;

/// Community member profile with structured attributes and free text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MemberProfile {
    #[validate(length(min = 1))]
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "workArea", default)]
    pub work_area: String,
    #[serde(rename = "subArea", default)]
    pub sub_area: String,
    #[serde(default)]
    pub industry: String,
    #[serde(rename = "companySize", default)]
    pub company_size: String,
    #[serde(rename = "businessStage", default)]
    pub business_stage: String,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub offers: Vec<String>,
    #[serde(default)]
    pub description: String,
    /// Derived semantic vector; absent until first computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl MemberProfile {
    /// Canonical text the embedding is computed from
    ///
    /// Concatenates every descriptive field so that the semantic vector
    /// reflects both the structured attributes and the free-text description.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} - {}\nArea: {} / {}\nIndustry: {}\nCompany size: {}\nStage: {}\nNeeds: {}\nOffers: {}\n{}",
            self.name,
            self.company,
            self.work_area,
            self.sub_area,
            self.industry,
            self.company_size,
            self.business_stage,
            self.needs.join(", "),
            self.offers.join(", "),
            self.description,
        )
    }
}

/// Structured attributes stored alongside a member's vector in the index
///
/// This is what the retriever hands back per hit. Every field is optional or
/// defaulted: a missing attribute means "no bonus" during scoring, never an
/// error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatePayload {
    #[serde(rename = "memberId", default)]
    pub member_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "workArea", default)]
    pub work_area: Option<String>,
    #[serde(rename = "subArea", default)]
    pub sub_area: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(rename = "companySize", default)]
    pub company_size: Option<String>,
    #[serde(rename = "businessStage", default)]
    pub business_stage: Option<String>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub offers: Vec<String>,
}

impl From<&MemberProfile> for CandidatePayload {
    fn from(profile: &MemberProfile) -> Self {
        Self {
            member_id: profile.member_id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            company: profile.company.clone(),
            work_area: Some(profile.work_area.clone()),
            sub_area: Some(profile.sub_area.clone()),
            industry: Some(profile.industry.clone()),
            company_size: Some(profile.company_size.clone()),
            business_stage: Some(profile.business_stage.clone()),
            needs: profile.needs.clone(),
            offers: profile.offers.clone(),
        }
    }
}

/// Affinity tier derived from the blended score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCategory {
    High,
    Medium,
    Low,
}

impl MatchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchCategory::High => "high",
            MatchCategory::Medium => "medium",
            MatchCategory::Low => "low",
        }
    }
}

impl std::fmt::Display for MatchCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored match result
///
/// Built fresh per ranking request and never persisted. Display fields are
/// denormalized copies of the candidate's stored payload at match time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "matchedMemberId")]
    pub matched_member_id: String,
    #[serde(rename = "matchedName")]
    pub matched_name: String,
    #[serde(rename = "matchedCompany")]
    pub matched_company: String,
    #[serde(rename = "affinityScore")]
    pub affinity_score: f64,
    pub reasons: Vec<String>,
    pub category: MatchCategory,
}

/// Scoring weights
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub work_area: f64,
    pub sub_area: f64,
    pub complementarity: f64,
    pub size_match: f64,
    pub size_diversity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.4,
            work_area: 0.1,
            sub_area: 0.1,
            complementarity: 0.3,
            size_match: 0.1,
            size_diversity: 0.05,
        }
    }
}
