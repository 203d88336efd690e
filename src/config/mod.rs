mod application_settings;
mod logging;
mod secret_config;
mod secret_manager;

pub use application_settings::{ApplicationSettings, SmtpSettings};
pub use logging::init_logging;
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::{SecretError, SecretManager};
