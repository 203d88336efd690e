use std::time::Duration;

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;

/// One-way notification port for identity emails
///
/// Callers treat every send as fire-and-forget: the return value is advisory
/// and is only ever logged.
#[async_trait::async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Send the account activation email with its activation link
    async fn send_activation_email(&self, to: &str, name: &str, activation_url: &str) -> bool;

    /// Confirm a successful account activation
    async fn send_activation_success_email(&self, to: &str, name: &str) -> bool;

    /// Deliver a two-factor verification code
    async fn send_verification_code(&self, to: &str, name: &str, code: &str) -> bool;
}

/// SMTP-backed notifier
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build a notifier from SMTP settings
    ///
    /// # Errors
    /// Returns a message when the relay host or from address is invalid
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, String> {
        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_address)
            .parse()
            .map_err(|e| format!("Invalid from address: {}", e))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .port(settings.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self { transport, from })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> bool {
        let to: Mailbox = match to.parse() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::error!("Invalid recipient address {}: {}", to, e);
                return false;
            }
        };

        let email = match Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
        {
            Ok(email) => email,
            Err(e) => {
                tracing::error!("Failed to build email: {}", e);
                return false;
            }
        };

        match self.transport.send(email).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to send email: {}", e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl EmailNotifier for SmtpNotifier {
    async fn send_activation_email(&self, to: &str, name: &str, activation_url: &str) -> bool {
        let body = format!(
            "Hi {},\n\
            \n\
            Welcome to Car Meet! To activate your account, open the following link:\n\
            \n\
            {}\n\
            \n\
            The link is valid for 24 hours.\n\
            \n\
            The Car Meet team",
            name, activation_url
        );

        self.send(to, "Activate your Car Meet account", body).await
    }

    async fn send_activation_success_email(&self, to: &str, name: &str) -> bool {
        let body = format!(
            "Hi {},\n\
            \n\
            Your Car Meet account has been activated. You can now log in.\n\
            \n\
            The Car Meet team",
            name
        );

        self.send(to, "Your Car Meet account is active", body).await
    }

    async fn send_verification_code(&self, to: &str, name: &str, code: &str) -> bool {
        let body = format!(
            "Hi {},\n\
            \n\
            Your verification code is:\n\
            \n\
            {}\n\
            \n\
            The code expires in 5 minutes. If you did not try to log in,\n\
            you can ignore this email.\n\
            \n\
            The Car Meet team",
            name, code
        );

        self.send(to, "Your Car Meet verification code", body).await
    }
}

/// Development fallback used when SMTP is not configured
///
/// Logs the email that would have been sent and reports success so the
/// surrounding flows behave like production.
pub struct LogOnlyNotifier;

#[async_trait::async_trait]
impl EmailNotifier for LogOnlyNotifier {
    async fn send_activation_email(&self, to: &str, name: &str, activation_url: &str) -> bool {
        tracing::info!(
            "SMTP not configured; activation email for {} <{}>: {}",
            name,
            to,
            activation_url
        );
        true
    }

    async fn send_activation_success_email(&self, to: &str, name: &str) -> bool {
        tracing::info!(
            "SMTP not configured; activation confirmation for {} <{}>",
            name,
            to
        );
        true
    }

    async fn send_verification_code(&self, to: &str, name: &str, code: &str) -> bool {
        tracing::info!(
            "SMTP not configured; verification code for {} <{}>: {}",
            name,
            to,
            code
        );
        true
    }
}
