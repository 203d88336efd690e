use std::sync::Arc;

use chrono::Utc;

use crate::errors::IdentityError;
use crate::services::email_notifier::EmailNotifier;
use crate::services::password_hasher::PasswordHasher;
use crate::services::token_service::TokenService;
use crate::services::verification_code::{CODE_TTL_SECONDS, VerificationCodeGenerator};
use crate::stores::{NewUser, ProfileUpdate, UserStore};
use crate::types::db::user;
use crate::types::dto::auth::{
    AdminLoginResponse, AuthTokenResponse, LoginStep1Response, RoleResponse, UserResponse,
};
use crate::types::internal::auth::TokenKind;

/// Slug of the role assigned to self-registered users
pub const DEFAULT_ROLE_SLUG: &str = "user";

/// Slug required by the admin login path
pub const ADMIN_ROLE_SLUG: &str = "admin";

/// Placeholder photo assigned when registration carries no photo; never
/// deleted from disk
pub const DEFAULT_PHOTO_PATH: &str = "uploads/defaults/avatar-placeholder.png";

/// Registration input
pub struct RegisterData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub photo_path: Option<String>,
}

/// Profile update input; omitted fields are left untouched
#[derive(Default)]
pub struct UpdateProfileData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// An empty string clears the stored number
    pub phone: Option<String>,
    pub photo_path: Option<String>,
}

/// Orchestrates the identity lifecycle: registration, activation, two-step
/// login, code verification and resend, profile retrieval and update
///
/// All collaborators are injected at construction so tests can substitute
/// them through the same seams production uses.
pub struct IdentityService {
    user_store: Arc<UserStore>,
    token_service: Arc<TokenService>,
    password_hasher: PasswordHasher,
    notifier: Arc<dyn EmailNotifier>,
    base_url: String,
}

impl IdentityService {
    /// Create a new IdentityService
    pub fn new(
        user_store: Arc<UserStore>,
        token_service: Arc<TokenService>,
        notifier: Arc<dyn EmailNotifier>,
        base_url: String,
    ) -> Self {
        Self {
            user_store,
            token_service,
            password_hasher: PasswordHasher::new(),
            notifier,
            base_url,
        }
    }

    /// Register a new user and dispatch the activation email
    ///
    /// The account starts inactive; a placeholder photo is assigned when none
    /// is supplied. Email delivery is fire-and-forget and never fails the
    /// registration.
    pub async fn register(&self, data: RegisterData) -> Result<UserResponse, IdentityError> {
        let email = normalize_email(&data.email);

        if self.user_store.find_by_email(&email).await?.is_some() {
            return Err(IdentityError::EmailAlreadyExists(email));
        }

        let role = self
            .user_store
            .find_or_create_role(DEFAULT_ROLE_SLUG, "User", Some("Standard user role"))
            .await?;

        let password_hash = self.password_hasher.hash(&data.password)?;

        let user = self
            .user_store
            .create_user(NewUser {
                first_name: data.first_name,
                last_name: data.last_name,
                email,
                phone: data.phone.filter(|p| !p.is_empty()),
                password_hash,
                role_id: role.id,
            })
            .await?;

        let photo_path = data
            .photo_path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PHOTO_PATH.to_string());
        self.user_store.upsert_photo(&user.id, &photo_path).await?;

        let activation_token = self
            .token_service
            .issue_activation_token(&user.id, &user.email)?;
        let activation_url = format!(
            "{}/api/auth/activate/{}",
            self.base_url.trim_end_matches('/'),
            activation_token
        );

        self.dispatch_activation_email(&user, activation_url);

        tracing::info!("Registered user {} ({})", user.id, user.email);

        self.sanitize(user).await
    }

    /// Activate an account from an activation token
    pub async fn activate_account(&self, token: &str) -> Result<UserResponse, IdentityError> {
        let claims = self.token_service.verify(token, TokenKind::Activation)?;

        let user = self
            .user_store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        // The token binds user and email at signing time; a changed email
        // invalidates outstanding activation links
        if user.email != claims.email {
            return Err(IdentityError::InvalidToken);
        }

        // Replay guard
        if user.is_active {
            return Err(IdentityError::AccountAlreadyActive);
        }

        let user = self.user_store.set_active(&user.id).await?;

        self.dispatch_activation_success_email(&user);

        tracing::info!("Activated account {} ({})", user.id, user.email);

        self.sanitize(user).await
    }

    /// First login step: check credentials and dispatch a verification code
    ///
    /// Unknown email and wrong password return the same error so responses do
    /// not reveal which emails are registered.
    pub async fn login_step1(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginStep1Response, IdentityError> {
        let user = self.authenticate(email, password).await?;

        self.issue_and_dispatch_code(&user).await?;

        Ok(LoginStep1Response {
            message: "A verification code has been sent to your email".to_string(),
            email: user.email,
        })
    }

    /// Admin variant of the first login step: requires the admin role
    pub async fn admin_login_step1(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, IdentityError> {
        let user = self.authenticate(email, password).await?;

        let role = self.user_store.role_by_id(&user.role_id).await?;
        if role.slug != ADMIN_ROLE_SLUG {
            return Err(IdentityError::NotAdmin);
        }

        self.issue_and_dispatch_code(&user).await?;

        Ok(AdminLoginResponse {
            message: "A verification code has been sent to your email".to_string(),
            email: user.email,
            role: role.slug,
        })
    }

    /// Second login step: verify the code and issue an access token
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
    ) -> Result<AuthTokenResponse, IdentityError> {
        let email = normalize_email(email);

        let user = self
            .user_store
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !user.is_active {
            return Err(IdentityError::AccountNotActivated);
        }

        let (code_hash, expires_at) = match (&user.verification_code_hash, user.code_expires_at) {
            (Some(hash), Some(expires_at)) => (hash.clone(), expires_at),
            _ => return Err(IdentityError::NoVerificationCode),
        };

        // Lazy cleanup: expired codes are wiped on the next touch
        if Utc::now().timestamp() > expires_at {
            self.user_store.clear_verification_code(&user.id).await?;
            return Err(IdentityError::VerificationCodeExpired);
        }

        // On mismatch the stored code stays intact so the user can retry
        // until the window closes
        if !self.password_hasher.compare(code, &code_hash) {
            return Err(IdentityError::InvalidVerificationCode);
        }

        // Single use
        self.user_store.clear_verification_code(&user.id).await?;

        let role = self.user_store.role_by_id(&user.role_id).await?;
        let token = self
            .token_service
            .issue_access_token(&user.id, &user.email, &role.slug)?;

        tracing::info!("User {} completed two-factor login", user.id);

        Ok(AuthTokenResponse {
            user: self.sanitize(user).await?,
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_service.access_token_ttl_seconds(),
        })
    }

    /// Resend the verification code, subject to the cooldown
    pub async fn resend_verification_code(
        &self,
        email: &str,
    ) -> Result<LoginStep1Response, IdentityError> {
        let email = normalize_email(email);

        let user = self
            .user_store
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if !user.is_active {
            return Err(IdentityError::AccountNotActivated);
        }

        // Cooldown: a pending unexpired code throttles resends; expired codes
        // are simply overwritten
        if let (Some(_), Some(expires_at)) = (&user.verification_code_hash, user.code_expires_at) {
            let remaining_seconds = expires_at - Utc::now().timestamp();
            if remaining_seconds > 0 {
                return Err(IdentityError::CodeAlreadySent {
                    remaining_minutes: remaining_seconds.div_ceil(60),
                });
            }
        }

        self.issue_and_dispatch_code(&user).await?;

        Ok(LoginStep1Response {
            message: "A new verification code has been sent to your email".to_string(),
            email: user.email,
        })
    }

    /// Load the sanitized profile of an authenticated user
    pub async fn current_user(&self, user_id: &str) -> Result<UserResponse, IdentityError> {
        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if !user.is_active {
            return Err(IdentityError::AccountNotActivated);
        }

        self.sanitize(user).await
    }

    /// Update profile fields; only supplied fields are merged
    ///
    /// When a new photo replaces an existing non-placeholder one, the old
    /// file is scheduled for best-effort deletion; the row update is the
    /// authoritative part.
    pub async fn update_profile(
        &self,
        user_id: &str,
        data: UpdateProfileData,
    ) -> Result<UserResponse, IdentityError> {
        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if let Some(new_path) = data.photo_path.filter(|p| !p.is_empty()) {
            if let Some(existing) = self.user_store.find_photo(&user.id).await? {
                if existing.path != DEFAULT_PHOTO_PATH && existing.path != new_path {
                    schedule_file_deletion(existing.path);
                }
            }
            self.user_store.upsert_photo(&user.id, &new_path).await?;
        }

        let changes = ProfileUpdate {
            first_name: data.first_name.filter(|v| !v.is_empty()),
            last_name: data.last_name.filter(|v| !v.is_empty()),
            phone: data
                .phone
                .map(|p| if p.is_empty() { None } else { Some(p) }),
        };

        let user = self.user_store.update_profile(&user.id, changes).await?;

        self.sanitize(user).await
    }

    /// Shared credential check for both login paths
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, IdentityError> {
        let email = normalize_email(email);

        let user = self
            .user_store
            .find_by_email(&email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self.password_hasher.compare(password, &user.password_hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(IdentityError::AccountNotActivated);
        }

        Ok(user)
    }

    /// Generate, persist and dispatch a fresh verification code
    ///
    /// Overwrites any previously pending code: only the most recently issued
    /// code validates.
    async fn issue_and_dispatch_code(&self, user: &user::Model) -> Result<(), IdentityError> {
        let code = VerificationCodeGenerator::generate();
        let code_hash = self.password_hasher.hash(&code)?;
        let expires_at = Utc::now().timestamp() + CODE_TTL_SECONDS;

        self.user_store
            .set_verification_code(&user.id, code_hash, expires_at)
            .await?;

        self.dispatch_verification_code(user, code);

        Ok(())
    }

    /// Build the sanitized user payload; never carries password or code fields
    async fn sanitize(&self, user: user::Model) -> Result<UserResponse, IdentityError> {
        let role = self.user_store.role_by_id(&user.role_id).await?;
        let photo = self.user_store.find_photo(&user.id).await?;

        Ok(UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            photo: photo.map(|p| p.path),
            is_active: user.is_active,
            role: RoleResponse {
                id: role.id,
                name: role.name,
                slug: role.slug,
            },
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    // Email dispatch is fire-and-forget: detached task, failure logged, the
    // caller's response is never affected

    fn dispatch_activation_email(&self, user: &user::Model, activation_url: String) {
        let notifier = Arc::clone(&self.notifier);
        let email = user.email.clone();
        let name = user.full_name();
        tokio::spawn(async move {
            if !notifier
                .send_activation_email(&email, &name, &activation_url)
                .await
            {
                tracing::error!("Failed to send activation email to {}", email);
            }
        });
    }

    fn dispatch_activation_success_email(&self, user: &user::Model) {
        let notifier = Arc::clone(&self.notifier);
        let email = user.email.clone();
        let name = user.full_name();
        tokio::spawn(async move {
            if !notifier.send_activation_success_email(&email, &name).await {
                tracing::error!("Failed to send activation confirmation to {}", email);
            }
        });
    }

    fn dispatch_verification_code(&self, user: &user::Model, code: String) {
        let notifier = Arc::clone(&self.notifier);
        let email = user.email.clone();
        let name = user.full_name();
        tokio::spawn(async move {
            if !notifier.send_verification_code(&email, &name, &code).await {
                tracing::error!("Failed to send verification code to {}", email);
            }
        });
    }
}

/// Emails compare case-insensitively; normalize at every entry point
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Best-effort removal of a replaced photo file
fn schedule_file_deletion(path: String) {
    tokio::spawn(async move {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to delete replaced photo {}: {}", path, e);
        }
    });
}
