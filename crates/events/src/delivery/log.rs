//! Transport used when no SMTP server is configured: messages are logged
//! and considered delivered.

use async_trait::async_trait;

use super::email::EmailError;
use super::MailTransport;
use crate::message::MailMessage;

#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), EmailError> {
        tracing::info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            body_len = message.html_body.len(),
            "Mail delivery disabled, message logged only"
        );
        Ok(())
    }
}
