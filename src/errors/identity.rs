use thiserror::Error;

/// Internal error type for identity operations
///
/// Closed taxonomy: the API layer converts each variant explicitly instead of
/// matching on message strings. Not exposed over the wire - endpoints must
/// convert to `AuthError`.
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Email already registered: {0}")]
    EmailAlreadyExists(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Account not activated")]
    AccountNotActivated,

    #[error("Account already active")]
    AccountAlreadyActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token type: expected {expected}, got {actual}")]
    InvalidTokenType { expected: String, actual: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("No verification code pending")]
    NoVerificationCode,

    #[error("Verification code expired")]
    VerificationCodeExpired,

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Verification code already sent, valid for {remaining_minutes} more minute(s)")]
    CodeAlreadySent { remaining_minutes: i64 },

    #[error("Admin role required")]
    NotAdmin,

    // Infrastructure failures, collapsed to 500 at the API edge
    #[error("Database operation '{operation}' failed: {source}")]
    Database {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Crypto operation '{operation}' failed: {message}")]
    Crypto { operation: String, message: String },
}

impl IdentityError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> Self {
        IdentityError::Database {
            operation: operation.to_string(),
            source,
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> Self {
        IdentityError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
