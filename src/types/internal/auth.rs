use std::fmt;

use serde::{Deserialize, Serialize};

/// Token category embedded in every JWT
///
/// An activation token must never be accepted where an access token is
/// expected, and vice versa; the discriminator is checked on every verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Single-purpose token proving a registration requested activation
    Activation,
    /// Token granted after full two-factor authentication
    Access,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Activation => write!(f, "activation"),
            TokenKind::Access => write!(f, "access"),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Email the token was issued for
    pub email: String,

    /// Role slug; only present on access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Token category discriminator
    pub token_type: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}
