use std::collections::HashSet;

use crate::models::{CandidatePayload, MemberProfile, ScoringWeights};

/// Calculate a blended affinity score (0.0-1.0) for a candidate
///
/// Scoring formula:
/// score = (
///     similarity * 0.4 +           # Semantic closeness from the retriever
///     work_area_bonus * 0.1 +      # Exact work-area match
///     sub_area_bonus * 0.1 +       # Exact sub-area match
///     complementarity * 0.3 +      # Candidate offers covering source needs
///     size_term                    # 0.1 same size class, else 0.05
/// )
///
/// The size term pays partial credit on a mismatch (size diversity is worth
/// something too), so the maximum pre-clamp score differs slightly by branch.
/// The final score is clamped to at most 1.0; with a non-negative similarity
/// the sum cannot go below 0.0.
pub fn calculate_affinity_score(
    source: &MemberProfile,
    candidate: &CandidatePayload,
    similarity: f64,
    weights: &ScoringWeights,
) -> f64 {
    // Base term: raw cosine similarity from the retriever
    let mut score = similarity * weights.similarity;

    // Exact attribute bonuses (case-sensitive; a missing candidate
    // attribute never matches)
    if candidate.work_area.as_deref() == Some(source.work_area.as_str()) {
        score += weights.work_area;
    }
    if candidate.sub_area.as_deref() == Some(source.sub_area.as_str()) {
        score += weights.sub_area;
    }

    // Complementarity: fraction of the source's needs covered by the
    // candidate's offers
    score += complementarity(&source.needs, &candidate.offers) * weights.complementarity;

    // Size-class term: full credit on a match, diversity credit otherwise
    if candidate.company_size.as_deref() == Some(source.company_size.as_str()) {
        score += weights.size_match;
    } else {
        score += weights.size_diversity;
    }

    score.min(1.0)
}

/// Fraction of `needs` satisfied by `offers` (0.0-1.0)
///
/// Both sides are lowercased and deduplicated before intersecting; the
/// denominator is the deduplicated need count, floored at 1 so a member with
/// no stated needs contributes exactly 0 instead of dividing by zero.
#[inline]
pub fn complementarity(needs: &[String], offers: &[String]) -> f64 {
    let needs: HashSet<String> = needs.iter().map(|n| n.to_lowercase()).collect();
    let offers: HashSet<String> = offers.iter().map(|o| o.to_lowercase()).collect();

    let overlap = needs.intersection(&offers).count();

    overlap as f64 / needs.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_profile(needs: Vec<&str>) -> MemberProfile {
        MemberProfile {
            member_id: "m_source".to_string(),
            name: "Source".to_string(),
            email: "source@nexo.test".to_string(),
            company: "SourceCo".to_string(),
            work_area: "Technology".to_string(),
            sub_area: "Software Development".to_string(),
            industry: "B2B".to_string(),
            company_size: "Small".to_string(),
            business_stage: "Growth".to_string(),
            needs: needs.into_iter().map(String::from).collect(),
            offers: vec!["Consulting".to_string()],
            description: "Test profile".to_string(),
            embedding: None,
        }
    }

    fn create_test_candidate(
        work_area: &str,
        sub_area: &str,
        company_size: &str,
        offers: Vec<&str>,
    ) -> CandidatePayload {
        CandidatePayload {
            member_id: "m_candidate".to_string(),
            name: "Candidate".to_string(),
            email: String::new(),
            company: "CandidateCo".to_string(),
            work_area: Some(work_area.to_string()),
            sub_area: Some(sub_area.to_string()),
            industry: Some("B2C".to_string()),
            company_size: Some(company_size.to_string()),
            business_stage: Some("Early".to_string()),
            needs: vec![],
            offers: offers.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_worked_scenario_scores_medium_band() {
        // needs {Financing, Networking}, offers {financing, consulting},
        // similarity 0.80, equal work area, unequal sub-area, equal size:
        // 0.8*0.4 + 0.1 + 0 + (1/2)*0.3 + 0.1 = 0.67
        let source = {
            let mut p = create_test_profile(vec!["Financing", "Networking"]);
            p.sub_area = "Software Development".to_string();
            p
        };
        let candidate = create_test_candidate(
            "Technology",
            "Product Design",
            "Small",
            vec!["financing", "consulting"],
        );

        let score =
            calculate_affinity_score(&source, &candidate, 0.80, &ScoringWeights::default());

        assert!((score - 0.67).abs() < 1e-9, "expected 0.67, got {}", score);
    }

    #[test]
    fn test_perfect_candidate_caps_at_one() {
        // Every attribute equal, full need/offer overlap, similarity 1.0:
        // 0.4 + 0.1 + 0.1 + 0.3 + 0.1 sums to exactly the 1.0 ceiling
        let source = create_test_profile(vec!["Financing"]);
        let candidate = create_test_candidate(
            "Technology",
            "Software Development",
            "Small",
            vec!["Financing"],
        );

        let score = calculate_affinity_score(&source, &candidate, 1.0, &ScoringWeights::default());

        assert!((score - 1.0).abs() < 1e-9, "expected 1.0, got {}", score);
    }

    #[test]
    fn test_clamp_holds_for_inflated_weights() {
        // Operators may override weights; the 1.0 ceiling still holds
        let weights = ScoringWeights {
            similarity: 0.9,
            work_area: 0.5,
            sub_area: 0.5,
            complementarity: 0.5,
            size_match: 0.5,
            size_diversity: 0.25,
        };
        let source = create_test_profile(vec!["Financing"]);
        let candidate = create_test_candidate(
            "Technology",
            "Software Development",
            "Small",
            vec!["Financing"],
        );

        let score = calculate_affinity_score(&source, &candidate, 1.0, &weights);

        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_empty_needs_contributes_zero_complementarity() {
        let source = create_test_profile(vec![]);
        let candidate = create_test_candidate(
            "Finance",
            "Accounting",
            "Large",
            vec!["Financing", "Networking", "Consulting"],
        );

        // No area/sub-area match, size mismatch: 0.5*0.4 + 0.05 = 0.25
        let score = calculate_affinity_score(&source, &candidate, 0.5, &ScoringWeights::default());

        assert!((score - 0.25).abs() < 1e-9, "expected 0.25, got {}", score);
    }

    #[test]
    fn test_complementarity_is_case_insensitive_and_deduplicated() {
        let needs = vec![
            "Financing".to_string(),
            "financing".to_string(),
            "Networking".to_string(),
        ];
        let offers = vec!["FINANCING".to_string()];

        // Dedup collapses the two financing needs; 1 of 2 needs covered
        assert!((complementarity(&needs, &offers) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_attribute_match_is_case_sensitive() {
        let source = create_test_profile(vec![]);
        let candidate = create_test_candidate("technology", "software development", "small", vec![]);

        // Lowercased candidate attributes must not earn the exact-match
        // bonuses: 0.5*0.4 + 0.05 = 0.25
        let score = calculate_affinity_score(&source, &candidate, 0.5, &ScoringWeights::default());

        assert!((score - 0.25).abs() < 1e-9, "expected 0.25, got {}", score);
    }

    #[test]
    fn test_missing_attributes_earn_no_bonus() {
        let source = create_test_profile(vec!["Financing"]);
        let candidate = CandidatePayload {
            member_id: "m_bare".to_string(),
            name: "Bare".to_string(),
            ..CandidatePayload::default()
        };

        // Only the base term and the 0.05 diversity credit apply
        let score = calculate_affinity_score(&source, &candidate, 0.5, &ScoringWeights::default());

        assert!((score - 0.25).abs() < 1e-9, "expected 0.25, got {}", score);
    }

    #[test]
    fn test_score_stays_in_unit_range() {
        let source = create_test_profile(vec!["Financing", "Networking"]);
        let candidate = create_test_candidate(
            "Technology",
            "Software Development",
            "Small",
            vec!["financing", "networking"],
        );

        for similarity in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let score = calculate_affinity_score(
                &source,
                &candidate,
                similarity,
                &ScoringWeights::default(),
            );
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}
