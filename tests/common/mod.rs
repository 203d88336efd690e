// Shared helpers for integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

use carmeet_backend::services::{EmailNotifier, IdentityService, TokenService};
use carmeet_backend::stores::UserStore;

pub const TEST_SECRET: &str = "test-secret-key-minimum-32-characters-long";

/// Email notifier that records every dispatch instead of sending
#[derive(Default)]
pub struct RecordingNotifier {
    pub activation_urls: Mutex<Vec<(String, String)>>,
    pub confirmations: Mutex<Vec<String>>,
    pub codes: Mutex<Vec<(String, String)>>,
}

#[async_trait::async_trait]
impl EmailNotifier for RecordingNotifier {
    async fn send_activation_email(&self, to: &str, _name: &str, activation_url: &str) -> bool {
        self.activation_urls
            .lock()
            .unwrap()
            .push((to.to_string(), activation_url.to_string()));
        true
    }

    async fn send_activation_success_email(&self, to: &str, _name: &str) -> bool {
        self.confirmations.lock().unwrap().push(to.to_string());
        true
    }

    async fn send_verification_code(&self, to: &str, _name: &str, code: &str) -> bool {
        self.codes
            .lock()
            .unwrap()
            .push((to.to_string(), code.to_string()));
        true
    }
}

impl RecordingNotifier {
    /// Email dispatch is detached; poll until the task has run
    pub async fn last_code_for(&self, email: &str) -> String {
        for _ in 0..100 {
            let found = self
                .codes
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, code)| code.clone());
            if let Some(code) = found {
                return code;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("No verification code recorded for {}", email);
    }

    pub async fn last_activation_url_for(&self, email: &str) -> String {
        for _ in 0..100 {
            let found = self
                .activation_urls
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(to, _)| to == email)
                .map(|(_, url)| url.clone());
            if let Some(url) = found {
                return url;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("No activation email recorded for {}", email);
    }
}

/// In-memory database, real migrations, recording notifier
pub async fn setup_identity_stack() -> (
    Arc<UserStore>,
    Arc<TokenService>,
    Arc<RecordingNotifier>,
    Arc<IdentityService>,
) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let user_store = Arc::new(UserStore::new(db));
    let token_service = Arc::new(TokenService::new(TEST_SECRET.to_string(), "7d"));
    let notifier = Arc::new(RecordingNotifier::default());

    let identity_service = Arc::new(IdentityService::new(
        user_store.clone(),
        token_service.clone(),
        notifier.clone(),
        "http://localhost:3000".to_string(),
    ));

    (user_store, token_service, notifier, identity_service)
}
