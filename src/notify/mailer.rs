use async_trait::async_trait;

use crate::models::EmailLog;
use crate::utils::AppResult;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailLog) -> AppResult<()>;
}

/// Delivery is stubbed: messages are written to the log instead of a
/// mail transport.
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
    async fn send(&self, email: &EmailLog) -> AppResult<()> {
        tracing::info!(
            email_id = %email.id,
            from = %self.from,
            to = %email.recipient,
            subject = %email.subject,
            "Email logged (delivery stubbed)"
        );
        tracing::debug!(email_id = %email.id, body = %email.body, "Email body");
        Ok(())
    }
}
