//! Session token creation and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use curricula_config::SessionConfig;
use curricula_core::AppError;

use crate::claims::SessionClaims;

/// Signs a session token for the given profile.
pub fn create_session_token(
    user_id: Uuid,
    email: &str,
    config: &SessionConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + config.expiry.max(0) as usize;

    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create session token: {}", e)))
}

/// Verifies signature and expiry and returns the embedded claims.
pub fn verify_session_token(token: &str, config: &SessionConfig) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthenticated("Invalid or expired session"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curricula_core::ErrorKind;

    fn test_config() -> SessionConfig {
        SessionConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            expiry: 3600,
            cookie_name: "sb-access-token".to_string(),
            cookie_secure: false,
        }
    }

    #[test]
    fn test_create_and_verify() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = create_session_token(user_id, "owner@district.org", &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();

        assert_eq!(claims.user_id(), Some(user_id));
        assert_eq!(claims.email, "owner@district.org");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let err = verify_session_token("not-a-token", &test_config()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthenticationRequired);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let config = test_config();
        let token = create_session_token(Uuid::new_v4(), "a@b.c", &config).unwrap();

        let other = SessionConfig {
            secret: "a-completely-different-secret-value-here".to_string(),
            ..config
        };
        assert!(verify_session_token(&token, &other).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let config = test_config();
        let now = Utc::now().timestamp() as usize;
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.c".to_string(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_session_token(&token, &config).is_err());
    }
}
