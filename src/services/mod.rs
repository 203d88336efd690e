// Services layer - Business logic and orchestration
pub mod email_notifier;
pub mod identity_service;
pub mod password_hasher;
pub mod token_service;
pub mod verification_code;

pub use email_notifier::{EmailNotifier, LogOnlyNotifier, SmtpNotifier};
pub use identity_service::{IdentityService, RegisterData, UpdateProfileData};
pub use password_hasher::PasswordHasher;
pub use token_service::TokenService;
pub use verification_code::VerificationCodeGenerator;
