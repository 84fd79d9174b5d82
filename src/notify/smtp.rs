use anyhow::Result;
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::Notifier;
use crate::core::MailConfig;

/// Delivers mail through an SMTP relay using implicit TLS
pub struct SmtpNotifier {
    sender: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let sender: Mailbox = config.sender_address.parse()?;
        let credentials = Credentials::new(config.sender_address.clone(), config.credential.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();
        Ok(Self { sender, transport })
    }

    fn build_message(&self, recipient: &str, subject: &str, html_body: &str) -> Result<Message> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> bool {
        let message = match self.build_message(recipient, subject, html_body) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Invalid message for {}: {}", recipient, e);
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::debug!("Sent \"{}\" to {}", subject, recipient);
                true
            }
            Err(e) => {
                tracing::error!("Email send error for {}: {}", recipient, e);
                false
            }
        }
    }
}
