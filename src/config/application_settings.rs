use std::env;

/// SMTP delivery settings; absent when SMTP_HOST is not configured
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_name: String,
    pub from_address: String,
}

/// Immutable application settings, loaded once at startup and injected into
/// the services that need them. Business logic never reads the environment.
#[derive(Debug, Clone)]
pub struct ApplicationSettings {
    /// Address the HTTP server binds to
    pub bind_address: String,

    /// Database connection string
    pub database_url: String,

    /// Public base URL used to build activation links
    pub base_url: String,

    /// Access token lifetime as `<N><unit>` (unit: s, m, h, d)
    pub access_token_lifetime: String,

    /// SMTP settings; emails are logged instead of sent when absent
    pub smtp: Option<SmtpSettings>,
}

impl ApplicationSettings {
    /// Load settings from environment variables with development defaults
    pub fn from_env() -> Self {
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://carmeet.db?mode=rwc".to_string());

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let access_token_lifetime =
            env::var("ACCESS_TOKEN_LIFETIME").unwrap_or_else(|_| "7d".to_string());

        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpSettings {
            host,
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Car Meet".to_string()),
            from_address: env::var("SMTP_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@carmeet.local".to_string()),
        });

        Self {
            bind_address,
            database_url,
            base_url,
            access_token_lifetime,
            smtp,
        }
    }
}
