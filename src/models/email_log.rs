use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::member::Member;
use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "email_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Pending,
    /// Claimed by a dispatcher, delivery in progress.
    Sending,
    Sent,
    Failed,
}

/// An `email_logs` row; pending rows form the outbox.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailLog {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl NewEmail {
    pub fn booking_confirmation(member: &Member, session: &Session, site_url: &str) -> Self {
        Self {
            recipient: member.email.clone(),
            subject: format!("Booking confirmed: {}", session.title),
            body: format!(
                "Hi {},\n\nYour spot in {} is confirmed.\nStarts: {}\nEnds: {}\n\n\
                 Manage your bookings at {}/bookings\n",
                member.full_name,
                session.title,
                session.start_time.format("%Y-%m-%d %H:%M UTC"),
                session.end_time.format("%Y-%m-%d %H:%M UTC"),
                site_url.trim_end_matches('/')
            ),
        }
    }

    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> EmailLog {
        EmailLog {
            id,
            recipient: self.recipient,
            subject: self.subject,
            body: self.body,
            status: EmailStatus::Pending,
            error: None,
            created_at,
            sent_at: None,
        }
    }
}
