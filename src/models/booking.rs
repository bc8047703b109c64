use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::email_log::NewEmail;
use super::notification::NewNotification;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Attended,
    Cancelled,
}

impl BookingStatus {
    /// `confirmed` is the only state with outgoing transitions.
    pub fn ensure_transition(self, to: BookingStatus) -> AppResult<()> {
        match (self, to) {
            (BookingStatus::Confirmed, BookingStatus::Attended)
            | (BookingStatus::Confirmed, BookingStatus::Cancelled) => Ok(()),
            (from, to) => Err(AppError::InvalidState(format!(
                "booking cannot move from {:?} to {:?}",
                from, to
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub member_id: Uuid,
    pub session_id: Uuid,
    pub member_package_id: Uuid,
    pub status: BookingStatus,
    pub booking_time: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub member_id: Uuid,
    pub session_id: Uuid,
}

/// Everything written by one booking, committed as a unit.
#[derive(Debug, Clone)]
pub struct BookingCommit {
    pub booking_id: Uuid,
    pub member_id: Uuid,
    pub session_id: Uuid,
    pub credit_id: Uuid,
    pub booked_at: DateTime<Utc>,
    pub notification: NewNotification,
    pub email: NewEmail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_reject_transitions() {
        assert!(BookingStatus::Confirmed
            .ensure_transition(BookingStatus::Attended)
            .is_ok());
        assert!(BookingStatus::Attended
            .ensure_transition(BookingStatus::Cancelled)
            .is_err());
        assert!(BookingStatus::Cancelled
            .ensure_transition(BookingStatus::Attended)
            .is_err());
        assert!(BookingStatus::Confirmed
            .ensure_transition(BookingStatus::Confirmed)
            .is_err());
    }
}
