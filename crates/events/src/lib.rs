//! Outbound mail for the bookings service.
//!
//! - [`MailMessage`]: the `{to, from, subject, html_body}` payload handlers
//!   produce.
//! - [`MailQueue`]: bounded hand-off used by request handlers; enqueuing
//!   never waits for delivery.
//! - [`MailDispatcher`]: background task draining the queue with bounded
//!   retries (at-least-once).
//! - [`delivery`]: the [`MailTransport`] seam with SMTP and log-only
//!   implementations.

pub mod delivery;
pub mod dispatcher;
pub mod message;

pub use delivery::email::{EmailConfig, EmailError, SmtpTransport};
pub use delivery::log::LogTransport;
pub use delivery::MailTransport;
pub use dispatcher::{MailDispatcher, MailQueue};
pub use message::MailMessage;
