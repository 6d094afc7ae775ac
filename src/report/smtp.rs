use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::render::DigestRenderer;
use super::{DeliverFuture, Reporter};
use crate::core::{Config, DigestError, PurchaseRecord};

/// Renders the digest as HTML and mails it over implicit-TLS SMTP.
#[derive(Debug, Clone)]
pub struct EmailReporter {
    renderer: DigestRenderer,
    smtp_host: String,
    sender: String,
    recipient: String,
    password: String,
}

impl EmailReporter {
    pub fn new(config: &Config) -> Self {
        Self {
            renderer: DigestRenderer {
                threshold: config.min_purchase_usd,
                lookback_days: config.lookback_days,
            },
            smtp_host: config.smtp_host.clone(),
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
            password: config.smtp_password.clone(),
        }
    }

    fn message(&self, content: &str, label: &str) -> Result<Message, DigestError> {
        Ok(Message::builder()
            .from(self.sender.parse()?)
            .to(self.recipient.parse()?)
            .subject(format!("Insider Buying Alert — {label}"))
            .header(ContentType::TEXT_HTML)
            .body(content.to_string())?)
    }

    async fn send(&self, content: &str, label: &str) -> Result<(), DigestError> {
        let message = self.message(content, label)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_host)?
            .credentials(Credentials::new(self.sender.clone(), self.password.clone()))
            .build();
        transport.send(message).await?;
        tracing::info!(recipient = %self.recipient, "digest sent");
        Ok(())
    }
}

impl Reporter for EmailReporter {
    fn render(&self, records: &[PurchaseRecord], label: &str) -> String {
        self.renderer.render(records, label)
    }

    fn deliver<'a>(&'a self, content: &'a str, label: &'a str) -> DeliverFuture<'a> {
        Box::pin(self.send(content, label))
    }
}
