//! Email alerts over SMTP.
//!
//! Every alert opens its own STARTTLS session, authenticates with the sender
//! credentials, sends one plain-text message and drops the connection.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};

use crate::{config::EmailSettings, models::PriceAlert};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Connection, TLS, authentication or send failure.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Delivers a [`PriceAlert`] somewhere a human will see it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotifyError>;
}

/// Subject and body of an alert email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    pub fn compose(alert: &PriceAlert, asset_label: &str, vs_currency: &str) -> Self {
        Self {
            subject: format!(
                "{asset_label} Price Alert: {} {}",
                alert.direction, alert.threshold
            ),
            body: format!(
                "The current {asset_label} price is {} {}.",
                alert.price,
                vs_currency.to_uppercase()
            ),
        }
    }
}

pub struct EmailNotifier {
    settings: EmailSettings,
    asset_label: String,
    vs_currency: String,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings, asset_label: String, vs_currency: String) -> Self {
        Self {
            settings,
            asset_label,
            vs_currency,
        }
    }

    fn build_email(&self, msg: &AlertMessage) -> Result<Message, NotifyError> {
        let email = Message::builder()
            .from(self.settings.sender_email.parse()?)
            .to(self.settings.recipient_email.parse()?)
            .subject(msg.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(msg.body.clone())?;

        Ok(email)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, alert: &PriceAlert) -> Result<(), NotifyError> {
        let msg = AlertMessage::compose(alert, &self.asset_label, &self.vs_currency);
        let email = self.build_email(&msg)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.smtp_host)?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.sender_email.clone(),
                self.settings.sender_password.clone(),
            ))
            .build();

        mailer.send(email).await?;

        tracing::info!(
            to = %self.settings.recipient_email,
            subject = %msg.subject,
            "Sent alert"
        );
        Ok(())
    }
}
