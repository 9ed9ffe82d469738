// src/utils/mail.rs

use std::fmt;

use async_trait::async_trait;

#[derive(Debug)]
pub struct MailError(pub String);

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MailError {}

/// A rendered verification e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl VerificationEmail {
    pub fn new(to: &str, code: &str, expires_in_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your verification code".to_string(),
            text: format!(
                "Your verification code is: {}. It expires in {} minutes.",
                code, expires_in_minutes
            ),
        }
    }
}

/// Outbound mail seam. The transport itself lives outside this service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: VerificationEmail) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: VerificationEmail) -> Result<(), MailError> {
        tracing::info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            "{}",
            email.text
        );
        Ok(())
    }
}
