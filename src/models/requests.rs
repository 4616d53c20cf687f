use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::MemberProfile;

/// Request to find matches for a member profile
///
/// When `limit` is omitted the configured default applies (10 unless
/// overridden); the handler caps it at the configured maximum.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(nested)]
    pub profile: MemberProfile,
    #[serde(default)]
    pub limit: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_absent_deserializes_as_none() {
        let json = r#"{"profile": {"memberId": "m_001", "name": "Ana"}}"#;
        let req: FindMatchesRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.limit, None);
        assert_eq!(req.profile.member_id, "m_001");
    }

    #[test]
    fn test_explicit_limit_is_kept() {
        let json = r#"{"profile": {"memberId": "m_001", "name": "Ana"}, "limit": 5}"#;
        let req: FindMatchesRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.limit, Some(5));
    }

    #[test]
    fn test_empty_member_id_fails_validation() {
        let json = r#"{"profile": {"memberId": "", "name": "Ana"}, "limit": 5}"#;
        let req: FindMatchesRequest = serde_json::from_str(json).unwrap();

        assert!(req.validate().is_err());
    }
}
