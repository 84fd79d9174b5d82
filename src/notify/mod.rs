//! Outbound email notifications. Delivery is best-effort: a failed send
//! is logged and counted, never propagated.

pub mod smtp;
pub mod templates;

pub use smtp::SmtpNotifier;
pub use templates::{EmailTemplate, templates};

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::MailConfig;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML message, returning whether the send succeeded. There
    /// is no retry.
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> bool;
}

/// Logs messages instead of delivering them. Used when no SMTP host is
/// configured.
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> bool {
        tracing::info!(
            recipient,
            subject,
            body_len = html_body.len(),
            "SMTP not configured, skipping delivery"
        );
        true
    }
}

/// Pick the notifier for this configuration
pub fn notifier_from_config(config: &MailConfig) -> Arc<dyn Notifier> {
    if config.smtp_host.is_empty() {
        return Arc::new(DryRunNotifier);
    }
    match SmtpNotifier::new(config) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::error!("Failed to build SMTP transport, falling back to dry run: {}", e);
            Arc::new(DryRunNotifier)
        }
    }
}

/// Send the same message to every recipient concurrently. A failure for
/// one recipient does not stop the others. Returns the number of
/// successful sends.
pub async fn broadcast_email(
    notifier: Arc<dyn Notifier>,
    recipients: Vec<String>,
    subject: String,
    html_body: String,
) -> usize {
    let messages = recipients
        .into_iter()
        .map(|recipient| (recipient, html_body.clone()))
        .collect();
    broadcast_messages(notifier, messages, subject).await
}

/// Like `broadcast_email` but with a body per recipient, given as
/// `(recipient, html_body)` pairs. A send that fails or panics is logged
/// and skipped.
pub async fn broadcast_messages(
    notifier: Arc<dyn Notifier>,
    messages: Vec<(String, String)>,
    subject: String,
) -> usize {
    let mut tasks = tokio::task::JoinSet::new();
    for (recipient, html_body) in messages {
        let notifier = Arc::clone(&notifier);
        let subject = subject.clone();
        tasks.spawn(async move {
            let sent = notifier.send(&recipient, &subject, &html_body).await;
            if !sent {
                tracing::warn!("Failed to send \"{}\" to {}", subject, recipient);
            }
            sent
        });
    }

    let mut sent = 0;
    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(true) => sent += 1,
            Ok(false) => {}
            Err(e) => tracing::error!("Notification task failed: {}", e),
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FlakyNotifier {
        fail_for: String,
        attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(&self, recipient: &str, _subject: &str, _html_body: &str) -> bool {
            self.attempts.lock().unwrap().push(recipient.to_string());
            recipient != self.fail_for
        }
    }

    #[tokio::test]
    async fn it_counts_successful_sends_and_keeps_going_after_failures() {
        let notifier = Arc::new(FlakyNotifier {
            fail_for: "b@example.com".to_string(),
            attempts: Mutex::new(vec![]),
        });
        let recipients = vec![
            "a@example.com".to_string(),
            "b@example.com".to_string(),
            "c@example.com".to_string(),
        ];

        let sent = broadcast_email(
            notifier.clone(),
            recipients,
            "Subject".to_string(),
            "<p>Body</p>".to_string(),
        )
        .await;

        assert_eq!(sent, 2);
        assert_eq!(notifier.attempts.lock().unwrap().len(), 3);
    }

    struct PanickingNotifier;

    #[async_trait]
    impl Notifier for PanickingNotifier {
        async fn send(&self, recipient: &str, _subject: &str, _html_body: &str) -> bool {
            if recipient == "b@example.com" {
                panic!("transport blew up");
            }
            true
        }
    }

    #[tokio::test]
    async fn it_survives_a_panicking_send() {
        let messages = vec![
            ("a@example.com".to_string(), "<p>A</p>".to_string()),
            ("b@example.com".to_string(), "<p>B</p>".to_string()),
            ("c@example.com".to_string(), "<p>C</p>".to_string()),
        ];
        let sent =
            broadcast_messages(Arc::new(PanickingNotifier), messages, "Subject".to_string()).await;
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn it_uses_dry_run_without_smtp_host() {
        let config = MailConfig {
            smtp_host: String::new(),
            smtp_port: 465,
            sender_address: "planner@example.com".to_string(),
            credential: String::new(),
            otp_expiry_minutes: 10,
        };
        let notifier = notifier_from_config(&config);
        assert!(notifier.send("a@example.com", "Hi", "<p>Hi</p>").await);
    }
}
