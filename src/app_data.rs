use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::{ApplicationSettings, SecretError, SecretManager};
use crate::services::{EmailNotifier, IdentityService, LogOnlyNotifier, SmtpNotifier, TokenService};
use crate::stores::UserStore;

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once in main.rs and shared across the API
/// layer. Stores are built before the services that depend on them.
pub struct AppData {
    pub db: DatabaseConnection,
    pub settings: Arc<ApplicationSettings>,
    pub secret_manager: Arc<SecretManager>,
    pub user_store: Arc<UserStore>,
    pub token_service: Arc<TokenService>,
    pub identity_service: Arc<IdentityService>,
}

impl AppData {
    /// Initialize all application data
    ///
    /// The database connection should be established and migrated before
    /// calling this.
    ///
    /// # Errors
    /// Returns `SecretError` when the signing secret is missing or invalid
    pub fn init(db: DatabaseConnection, settings: ApplicationSettings) -> Result<Self, SecretError> {
        tracing::info!("Initializing AppData...");

        let settings = Arc::new(settings);
        let secret_manager = Arc::new(SecretManager::init()?);

        let user_store = Arc::new(UserStore::new(db.clone()));

        let token_service = Arc::new(TokenService::new(
            secret_manager.jwt_secret().to_string(),
            &settings.access_token_lifetime,
        ));

        let notifier: Arc<dyn EmailNotifier> = match &settings.smtp {
            Some(smtp) => match SmtpNotifier::from_settings(smtp) {
                Ok(notifier) => Arc::new(notifier),
                Err(e) => {
                    tracing::error!("SMTP configuration invalid, falling back to log-only: {}", e);
                    Arc::new(LogOnlyNotifier)
                }
            },
            None => {
                tracing::warn!("SMTP not configured; emails will be logged instead of sent");
                Arc::new(LogOnlyNotifier)
            }
        };

        let identity_service = Arc::new(IdentityService::new(
            user_store.clone(),
            token_service.clone(),
            notifier,
            settings.base_url.clone(),
        ));

        tracing::info!("AppData initialization complete");

        Ok(Self {
            db,
            settings,
            secret_manager,
            user_store,
            token_service,
            identity_service,
        })
    }
}
