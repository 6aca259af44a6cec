//! Delivery channels for outbound mail.

use async_trait::async_trait;

use crate::message::MailMessage;

pub mod email;
pub mod log;

/// Something that can hand a message to a mail server (or pretend to).
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), email::EmailError>;
}
