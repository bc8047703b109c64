use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::matcher::match_credit;
use crate::models::{Booking, BookingCommit, BookingRequest, NewEmail, NewNotification, Session};
use crate::notify::OutboxSignal;
use crate::store::GymStore;
use crate::utils::{AppError, AppResult};

/// Turns a booking request into one atomic store commit.
#[derive(Clone)]
pub struct BookingCommitter {
    store: Arc<dyn GymStore>,
    outbox: OutboxSignal,
    site_url: String,
}

impl BookingCommitter {
    pub fn new(
        store: Arc<dyn GymStore>,
        outbox: OutboxSignal,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            outbox,
            site_url: site_url.into(),
        }
    }

    pub async fn book(&self, request: &BookingRequest, now: DateTime<Utc>) -> AppResult<Booking> {
        let session = self
            .store
            .find_session(request.session_id)
            .await?
            .ok_or_else(|| AppError::not_found("Session", request.session_id))?;
        if !session.is_bookable(now) {
            return Err(AppError::ValidationError(format!(
                "session {} is not open for booking",
                session.id
            )));
        }
        if !session.has_open_capacity() {
            return Err(AppError::CapacityExceeded(session.id));
        }

        let member = self
            .store
            .find_member(request.member_id)
            .await?
            .ok_or_else(|| AppError::not_found("Member", request.member_id))?;
        let credits = self
            .store
            .active_credits(Some(member.id), now.date_naive())
            .await?;
        let Some(credit) = match_credit(&credits, &session) else {
            return Err(self.unmatched(&session, member.id).await);
        };

        let commit = BookingCommit {
            booking_id: Uuid::new_v4(),
            member_id: member.id,
            session_id: session.id,
            credit_id: credit.id,
            booked_at: now,
            notification: NewNotification::booking_confirmed(member.profile_id, &session, credit),
            email: NewEmail::booking_confirmation(&member, &session, &self.site_url),
        };
        let booking = self.store.commit_booking(commit).await?;

        tracing::info!(
            booking_id = %booking.id,
            member_id = %member.id,
            session_id = %session.id,
            credit_id = %credit.id,
            "Booking committed"
        );
        self.outbox.wake();
        Ok(booking)
    }

    /// No credit matched. A concurrent commit may have taken both the last
    /// seat and this member's last credit, in which case the seat is what
    /// the caller lost.
    async fn unmatched(&self, session: &Session, member_id: Uuid) -> AppError {
        match self.store.find_session(session.id).await {
            Ok(Some(current)) if !current.has_open_capacity() => {
                AppError::CapacityExceeded(session.id)
            }
            Err(e) => e,
            _ => AppError::NoEligiblePackage(format!(
                "member {} holds no '{}' package with sessions remaining",
                member_id, session.package_type
            )),
        }
    }
}
