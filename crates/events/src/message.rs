use serde::{Deserialize, Serialize};

/// A single HTML email waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
}

impl MailMessage {
    pub fn new(
        to: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}
