use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::errors::IdentityError;
use crate::types::internal::auth::{Claims, TokenKind};

/// Activation tokens always live for 24 hours
const ACTIVATION_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Fallback when the configured access token lifetime cannot be parsed
const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Manages JWT issuance and verification for both token kinds
pub struct TokenService {
    jwt_secret: String,
    access_token_ttl_seconds: i64,
}

impl TokenService {
    /// Create a new TokenService
    ///
    /// # Arguments
    /// * `jwt_secret` - Shared signing secret
    /// * `access_token_lifetime` - Lifetime as `<N><unit>` (unit: s, m, h, d);
    ///   unparsable input falls back to 7 days
    pub fn new(jwt_secret: String, access_token_lifetime: &str) -> Self {
        Self {
            jwt_secret,
            access_token_ttl_seconds: parse_lifetime(access_token_lifetime)
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECONDS),
        }
    }

    /// Issue an activation token for a freshly registered user
    pub fn issue_activation_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<String, IdentityError> {
        self.issue(user_id, email, None, TokenKind::Activation, ACTIVATION_TOKEN_TTL_SECONDS)
    }

    /// Issue an access token after a completed two-factor login
    pub fn issue_access_token(
        &self,
        user_id: &str,
        email: &str,
        role_slug: &str,
    ) -> Result<String, IdentityError> {
        self.issue(
            user_id,
            email,
            Some(role_slug.to_string()),
            TokenKind::Access,
            self.access_token_ttl_seconds,
        )
    }

    fn issue(
        &self,
        user_id: &str,
        email: &str,
        role: Option<String>,
        token_type: TokenKind,
        ttl_seconds: i64,
    ) -> Result<String, IdentityError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            token_type,
            iat: now,
            exp: now + ttl_seconds,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| IdentityError::crypto("jwt_signing", e.to_string()))
    }

    /// Verify a token and check that it is of the expected kind
    ///
    /// # Returns
    /// * `Ok(Claims)` - The decoded claims
    /// * `Err(IdentityError)` - `TokenExpired` past expiry, `InvalidToken` for
    ///   signature/structure failures, `InvalidTokenType` on kind mismatch
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, IdentityError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => IdentityError::TokenExpired,
            _ => IdentityError::InvalidToken,
        })?;

        let claims = token_data.claims;
        if claims.token_type != expected {
            return Err(IdentityError::InvalidTokenType {
                expected: expected.to_string(),
                actual: claims.token_type.to_string(),
            });
        }

        Ok(claims)
    }

    /// Access token lifetime in seconds, for the client-facing `expires_in`
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }
}

/// Parse a `<N><unit>` lifetime string into seconds
///
/// Returns None for anything that does not match the format, including
/// missing units and non-positive amounts.
fn parse_lifetime(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.len() < 2 {
        return None;
    }

    let (amount, unit) = value.split_at(value.len() - 1);
    let amount: i64 = amount.parse().ok().filter(|n| *n > 0)?;

    match unit {
        "s" => Some(amount),
        "m" => Some(amount * 60),
        "h" => Some(amount * 60 * 60),
        "d" => Some(amount * 24 * 60 * 60),
        _ => None,
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .finish()
    }
}

impl fmt::Display for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenService {{ access_token_ttl: {}s }}",
            self.access_token_ttl_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

    fn test_token_service() -> TokenService {
        TokenService::new(TEST_SECRET.to_string(), "7d")
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_token_service();
        let user_id = Uuid::new_v4().to_string();

        let token = service
            .issue_access_token(&user_id, "ana@x.com", "user")
            .unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.role.as_deref(), Some("user"));
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_activation_token_round_trip() {
        let service = test_token_service();
        let user_id = Uuid::new_v4().to_string();

        let token = service
            .issue_activation_token(&user_id, "ana@x.com")
            .unwrap();
        let claims = service.verify(&token, TokenKind::Activation).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "ana@x.com");
        assert_eq!(claims.role, None);
        assert_eq!(claims.token_type, TokenKind::Activation);
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_activation_token_rejected_where_access_expected() {
        let service = test_token_service();

        let token = service
            .issue_activation_token("some-user", "ana@x.com")
            .unwrap();
        let result = service.verify(&token, TokenKind::Access);

        match result {
            Err(IdentityError::InvalidTokenType { expected, actual }) => {
                assert_eq!(expected, "access");
                assert_eq!(actual, "activation");
            }
            _ => panic!("Expected InvalidTokenType error"),
        }
    }

    #[test]
    fn test_access_token_rejected_where_activation_expected() {
        let service = test_token_service();

        let token = service
            .issue_access_token("some-user", "ana@x.com", "user")
            .unwrap();
        let result = service.verify(&token, TokenKind::Activation);

        assert!(matches!(
            result,
            Err(IdentityError::InvalidTokenType { .. })
        ));
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let service = test_token_service();
        let other = TokenService::new("wrong-secret-key-minimum-32-characters".to_string(), "7d");

        let token = service
            .issue_access_token("some-user", "ana@x.com", "user")
            .unwrap();
        let result = other.verify(&token, TokenKind::Access);

        assert!(matches!(result, Err(IdentityError::InvalidToken)));
    }

    #[test]
    fn test_verify_fails_with_garbage_token() {
        let service = test_token_service();

        let result = service.verify("not-a-jwt", TokenKind::Access);

        assert!(matches!(result, Err(IdentityError::InvalidToken)));
    }

    #[test]
    fn test_verify_fails_with_expired_token() {
        let service = test_token_service();

        // Mint an already expired token by hand
        let now = Utc::now().timestamp();
        let expired_claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "ana@x.com".to_string(),
            role: Some("user".to_string()),
            token_type: TokenKind::Access,
            iat: now - 7200,
            exp: now - 3600,
        };
        let expired_token = encode(
            &Header::new(Algorithm::HS256),
            &expired_claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.verify(&expired_token, TokenKind::Access);

        assert!(matches!(result, Err(IdentityError::TokenExpired)));
    }

    #[test]
    fn test_parse_lifetime_units() {
        assert_eq!(parse_lifetime("30s"), Some(30));
        assert_eq!(parse_lifetime("5m"), Some(300));
        assert_eq!(parse_lifetime("2h"), Some(7200));
        assert_eq!(parse_lifetime("7d"), Some(604_800));
        assert_eq!(parse_lifetime(" 1d "), Some(86_400));
    }

    #[test]
    fn test_parse_lifetime_rejects_garbage() {
        assert_eq!(parse_lifetime(""), None);
        assert_eq!(parse_lifetime("d"), None);
        assert_eq!(parse_lifetime("7"), None);
        assert_eq!(parse_lifetime("7w"), None);
        assert_eq!(parse_lifetime("-7d"), None);
        assert_eq!(parse_lifetime("0d"), None);
        assert_eq!(parse_lifetime("sevend"), None);
    }

    #[test]
    fn test_unparsable_lifetime_falls_back_to_seven_days() {
        let service = TokenService::new(TEST_SECRET.to_string(), "soon");

        assert_eq!(service.access_token_ttl_seconds(), 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_configured_lifetime_drives_expires_in() {
        let service = TokenService::new(TEST_SECRET.to_string(), "15m");

        assert_eq!(service.access_token_ttl_seconds(), 900);

        let token = service
            .issue_access_token("some-user", "ana@x.com", "user")
            .unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_debug_does_not_expose_secret() {
        let service = test_token_service();
        let debug_output = format!("{:?}", service);

        assert!(!debug_output.contains(TEST_SECRET));
        assert!(debug_output.contains("<redacted>"));
    }
}
