use std::sync::Arc;

use poem_openapi::param::Path;
use poem_openapi::{OpenApi, SecurityScheme, Tags, auth::Bearer, payload::Json};

use crate::errors::AuthError;
use crate::services::identity_service::{RegisterData, UpdateProfileData};
use crate::services::{IdentityService, TokenService};
use crate::types::dto::auth::{
    ActivationResponse, AdminLoginResponse, AuthTokenResponse, LoginRequest, LoginStep1Response,
    RegisterRequest, ResendCodeRequest, UpdateProfileRequest, UserResponse, VerifyCodeRequest,
};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::auth::TokenKind;

/// Authentication API endpoints
pub struct AuthApi {
    identity_service: Arc<IdentityService>,
    token_service: Arc<TokenService>,
}

impl AuthApi {
    /// Create a new AuthApi with the given IdentityService and TokenService
    pub fn new(identity_service: Arc<IdentityService>, token_service: Arc<TokenService>) -> Self {
        Self {
            identity_service,
            token_service,
        }
    }
}

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(ty = "bearer", bearer_format = "JWT")]
pub struct BearerAuth(Bearer);

/// API tags for authentication endpoints
#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new account; an activation email is sent out of band
    #[oai(path = "/register", method = "post", tag = "AuthTags::Authentication")]
    async fn register(&self, body: Json<RegisterRequest>) -> Result<Json<UserResponse>, AuthError> {
        let body = body.0;

        let user = self
            .identity_service
            .register(RegisterData {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                phone: body.phone,
                password: body.password,
                photo_path: body.photo_path,
            })
            .await?;

        Ok(Json(user))
    }

    /// Activate an account using the emailed activation token
    #[oai(path = "/activate/:token", method = "get", tag = "AuthTags::Authentication")]
    async fn activate(&self, token: Path<String>) -> Result<Json<ActivationResponse>, AuthError> {
        let user = self.identity_service.activate_account(&token.0).await?;

        Ok(Json(ActivationResponse {
            message: "Account activated successfully. You can now log in".to_string(),
            user,
        }))
    }

    /// First login step: verify credentials and send a verification code
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(&self, body: Json<LoginRequest>) -> Result<Json<LoginStep1Response>, AuthError> {
        let response = self
            .identity_service
            .login_step1(&body.email, &body.password)
            .await?;

        Ok(Json(response))
    }

    /// Admin login step one: additionally requires the admin role
    #[oai(path = "/admin/login", method = "post", tag = "AuthTags::Authentication")]
    async fn admin_login(
        &self,
        body: Json<LoginRequest>,
    ) -> Result<Json<AdminLoginResponse>, AuthError> {
        let response = self
            .identity_service
            .admin_login_step1(&body.email, &body.password)
            .await?;

        Ok(Json(response))
    }

    /// Second login step: exchange the verification code for an access token
    #[oai(path = "/verify-code", method = "post", tag = "AuthTags::Authentication")]
    async fn verify_code(
        &self,
        body: Json<VerifyCodeRequest>,
    ) -> Result<Json<AuthTokenResponse>, AuthError> {
        let response = self
            .identity_service
            .verify_code(&body.email, &body.code)
            .await?;

        Ok(Json(response))
    }

    /// Resend the verification code, subject to the cooldown
    #[oai(path = "/resend-code", method = "post", tag = "AuthTags::Authentication")]
    async fn resend_code(
        &self,
        body: Json<ResendCodeRequest>,
    ) -> Result<Json<LoginStep1Response>, AuthError> {
        let response = self
            .identity_service
            .resend_verification_code(&body.email)
            .await?;

        Ok(Json(response))
    }

    /// Return the authenticated user's profile
    #[oai(path = "/me", method = "get", tag = "AuthTags::Authentication")]
    async fn me(&self, auth: BearerAuth) -> Result<Json<UserResponse>, AuthError> {
        let claims = self.token_service.verify(&auth.0.token, TokenKind::Access)?;

        let user = self.identity_service.current_user(&claims.sub).await?;

        Ok(Json(user))
    }

    /// Update the authenticated user's profile
    ///
    /// The target user always comes from the verified token, never from the
    /// request body.
    #[oai(path = "/profile", method = "put", tag = "AuthTags::Authentication")]
    async fn update_profile(
        &self,
        auth: BearerAuth,
        body: Json<UpdateProfileRequest>,
    ) -> Result<Json<UserResponse>, AuthError> {
        let claims = self.token_service.verify(&auth.0.token, TokenKind::Access)?;
        let body = body.0;

        let user = self
            .identity_service
            .update_profile(
                &claims.sub,
                UpdateProfileData {
                    first_name: body.first_name,
                    last_name: body.last_name,
                    phone: body.phone,
                    photo_path: body.photo_path,
                },
            )
            .await?;

        Ok(Json(user))
    }

    /// Stateless logout acknowledgement; clients drop the token
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, auth: BearerAuth) -> Result<Json<MessageResponse>, AuthError> {
        // Validates the token so dead sessions get a 401 instead of a 200
        self.token_service.verify(&auth.0.token, TokenKind::Access)?;

        Ok(Json(MessageResponse {
            message: "Session closed".to_string(),
        }))
    }
}
