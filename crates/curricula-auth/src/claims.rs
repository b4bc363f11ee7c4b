//! Session token claims.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims carried by a session token.
///
/// A session proves identity only. Roles are never embedded here; they are
/// read from the profile record on every request that needs them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionClaims {
    /// Profile ID (subject claim)
    pub sub: String,
    pub email: String,
    /// Expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl SessionClaims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_have_no_role_field() {
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            email: "teacher@district.org".to_string(),
            exp: 9999999999,
            iat: 1234567890,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("role").is_none());
        assert_eq!(value["email"], "teacher@district.org");
    }

    #[test]
    fn test_user_id_parses_uuid_subject() {
        let id = Uuid::new_v4();
        let claims = SessionClaims {
            sub: id.to_string(),
            email: "a@b.c".to_string(),
            exp: 1,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(id));

        let bad = SessionClaims {
            sub: "not-a-uuid".to_string(),
            ..claims
        };
        assert_eq!(bad.user_id(), None);
    }
}
