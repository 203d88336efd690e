use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for user registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address; must not already be registered
    pub email: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Plaintext password; never stored as-is
    pub password: String,

    /// Optional path to an already stored profile photo
    pub photo_path: Option<String>,
}

/// Request model for the first login step
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Request model for the second login step
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    /// Email address the code was sent to
    pub email: String,

    /// 6-digit verification code
    pub code: String,
}

/// Request model for resending the verification code
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ResendCodeRequest {
    /// Email address
    pub email: String,
}

/// Request model for profile update; omitted fields are left untouched
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,

    /// New phone number; an empty string clears the stored number
    pub phone: Option<String>,

    /// Path to a newly stored profile photo
    pub photo_path: Option<String>,
}

/// Role information embedded in user responses
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    /// Role id
    pub id: String,

    /// Display name
    pub name: String,

    /// Role slug (e.g. "user", "admin")
    pub slug: String,
}

/// Sanitized user profile; never carries password or code material
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id
    pub id: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address
    pub email: String,

    /// Phone number, if any
    pub phone: Option<String>,

    /// Path of the profile photo
    pub photo: Option<String>,

    /// Whether the account has been activated
    pub is_active: bool,

    /// Assigned role
    pub role: RoleResponse,

    /// Creation time (Unix timestamp)
    pub created_at: i64,

    /// Last update time (Unix timestamp)
    pub updated_at: i64,
}

/// Response model for login step one and code resend
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginStep1Response {
    /// Human-readable status message
    pub message: String,

    /// Email the verification code was sent to
    pub email: String,
}

/// Response model for admin login step one
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    /// Human-readable status message
    pub message: String,

    /// Email the verification code was sent to
    pub email: String,

    /// Role slug of the authenticated admin
    pub role: String,
}

/// Response model for a completed two-factor login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    /// Sanitized user profile
    pub user: UserResponse,

    /// JWT access token for API authentication
    pub token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,
}

/// Response model for account activation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ActivationResponse {
    /// Human-readable status message
    pub message: String,

    /// The activated user
    pub user: UserResponse,
}
