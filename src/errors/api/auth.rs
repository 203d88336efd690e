use std::fmt;

use poem_openapi::{ApiResponse, Object, payload::Json};

use crate::errors::identity::IdentityError;

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Email is already registered
    #[oai(status = 409)]
    EmailAlreadyExists(Json<AuthErrorResponse>),

    /// User does not exist
    #[oai(status = 404)]
    UserNotFound(Json<AuthErrorResponse>),

    /// Account has not been activated yet
    #[oai(status = 403)]
    AccountNotActivated(Json<AuthErrorResponse>),

    /// Account was already activated
    #[oai(status = 409)]
    AccountAlreadyActive(Json<AuthErrorResponse>),

    /// Invalid email or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Invalid, malformed or wrong-kind token
    #[oai(status = 401)]
    InvalidToken(Json<AuthErrorResponse>),

    /// Token has expired
    #[oai(status = 401)]
    ExpiredToken(Json<AuthErrorResponse>),

    /// No verification code pending for this account
    #[oai(status = 400)]
    NoVerificationCode(Json<AuthErrorResponse>),

    /// Verification code has expired
    #[oai(status = 400)]
    VerificationCodeExpired(Json<AuthErrorResponse>),

    /// Verification code does not match
    #[oai(status = 400)]
    InvalidVerificationCode(Json<AuthErrorResponse>),

    /// A verification code was already sent recently
    #[oai(status = 429)]
    CodeAlreadySent(Json<AuthErrorResponse>),

    /// Admin role required
    #[oai(status = 403)]
    NotAdmin(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<AuthErrorResponse> {
        Json(AuthErrorResponse {
            error: error.to_string(),
            message: message.into(),
            status_code,
        })
    }

    /// Create an EmailAlreadyExists error
    pub fn email_already_exists() -> Self {
        AuthError::EmailAlreadyExists(Self::body(
            "email_already_exists",
            "Email is already registered",
            409,
        ))
    }

    /// Create a UserNotFound error
    pub fn user_not_found() -> Self {
        AuthError::UserNotFound(Self::body("user_not_found", "User not found", 404))
    }

    /// Create an AccountNotActivated error
    pub fn account_not_activated() -> Self {
        AuthError::AccountNotActivated(Self::body(
            "account_not_activated",
            "Account has not been activated. Please check your email",
            403,
        ))
    }

    /// Create an AccountAlreadyActive error
    pub fn account_already_active() -> Self {
        AuthError::AccountAlreadyActive(Self::body(
            "account_already_active",
            "Account has already been activated",
            409,
        ))
    }

    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Self::body(
            "invalid_credentials",
            "Invalid email or password",
            401,
        ))
    }

    /// Create an InvalidToken error
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Self::body("invalid_token", "Invalid or malformed token", 401))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Self::body("expired_token", "Token has expired", 401))
    }

    /// Create a NoVerificationCode error
    pub fn no_verification_code() -> Self {
        AuthError::NoVerificationCode(Self::body(
            "no_verification_code",
            "No verification code pending. Please log in first",
            400,
        ))
    }

    /// Create a VerificationCodeExpired error
    pub fn verification_code_expired() -> Self {
        AuthError::VerificationCodeExpired(Self::body(
            "verification_code_expired",
            "Verification code has expired",
            400,
        ))
    }

    /// Create an InvalidVerificationCode error
    pub fn invalid_verification_code() -> Self {
        AuthError::InvalidVerificationCode(Self::body(
            "invalid_verification_code",
            "Verification code is incorrect",
            400,
        ))
    }

    /// Create a CodeAlreadySent error with the remaining cooldown
    pub fn code_already_sent(remaining_minutes: i64) -> Self {
        AuthError::CodeAlreadySent(Self::body(
            "code_already_sent",
            format!(
                "A verification code was already sent. Try again in {} minute(s)",
                remaining_minutes
            ),
            429,
        ))
    }

    /// Create a NotAdmin error
    pub fn not_admin() -> Self {
        AuthError::NotAdmin(Self::body(
            "not_admin",
            "Access denied. Admin role required",
            403,
        ))
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    fn internal_server_error() -> Self {
        AuthError::InternalError(Self::body(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    /// Convert IdentityError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API
    /// errors. Internal error details are logged but not exposed to clients.
    pub fn from_identity_error(err: IdentityError) -> Self {
        match &err {
            IdentityError::EmailAlreadyExists(email) => {
                tracing::warn!("Duplicate registration attempt: {}", email);
                Self::email_already_exists()
            }
            IdentityError::UserNotFound => {
                tracing::debug!("User lookup failed");
                Self::user_not_found()
            }
            IdentityError::AccountNotActivated => {
                tracing::debug!("Operation on non-activated account");
                Self::account_not_activated()
            }
            IdentityError::AccountAlreadyActive => {
                tracing::debug!("Activation replay on active account");
                Self::account_already_active()
            }
            IdentityError::InvalidCredentials => {
                tracing::debug!("Invalid credentials attempt");
                Self::invalid_credentials()
            }
            IdentityError::InvalidToken => {
                tracing::debug!("Invalid token presented");
                Self::invalid_token()
            }
            IdentityError::InvalidTokenType { expected, actual } => {
                tracing::debug!("Token kind mismatch: expected {}, got {}", expected, actual);
                Self::invalid_token()
            }
            IdentityError::TokenExpired => {
                tracing::debug!("Expired token presented");
                Self::expired_token()
            }
            IdentityError::NoVerificationCode => Self::no_verification_code(),
            IdentityError::VerificationCodeExpired => Self::verification_code_expired(),
            IdentityError::InvalidVerificationCode => {
                tracing::debug!("Wrong verification code submitted");
                Self::invalid_verification_code()
            }
            IdentityError::CodeAlreadySent { remaining_minutes } => {
                Self::code_already_sent(*remaining_minutes)
            }
            IdentityError::NotAdmin => {
                tracing::warn!("Non-admin attempted admin login");
                Self::not_admin()
            }

            // Infrastructure errors - always log and return a generic error
            IdentityError::Database { operation, .. } => {
                tracing::error!("Database error in {}: {}", operation, err);
                Self::internal_server_error()
            }
            IdentityError::PasswordHash(_) => {
                tracing::error!("Password hashing error: {}", err);
                Self::internal_server_error()
            }
            IdentityError::Crypto { operation, .. } => {
                tracing::error!("Crypto error in {}: {}", operation, err);
                Self::internal_server_error()
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::EmailAlreadyExists(json) => json.0.message.clone(),
            AuthError::UserNotFound(json) => json.0.message.clone(),
            AuthError::AccountNotActivated(json) => json.0.message.clone(),
            AuthError::AccountAlreadyActive(json) => json.0.message.clone(),
            AuthError::InvalidCredentials(json) => json.0.message.clone(),
            AuthError::InvalidToken(json) => json.0.message.clone(),
            AuthError::ExpiredToken(json) => json.0.message.clone(),
            AuthError::NoVerificationCode(json) => json.0.message.clone(),
            AuthError::VerificationCodeExpired(json) => json.0.message.clone(),
            AuthError::InvalidVerificationCode(json) => json.0.message.clone(),
            AuthError::CodeAlreadySent(json) => json.0.message.clone(),
            AuthError::NotAdmin(json) => json.0.message.clone(),
            AuthError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        Self::from_identity_error(err)
    }
}
