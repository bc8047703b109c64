use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::package::{Package, PackageCredit};
use super::session::Session;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BookingConfirmed,
    BookingCancelled,
    SessionCancelled,
    PackageApproved,
    PackageRejected,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::SessionCancelled => "session_cancelled",
            NotificationKind::PackageApproved => "package_approved",
            NotificationKind::PackageRejected => "package_rejected",
        }
    }
}

/// Notification content, built before the write that produces it.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn booking_confirmed(user_id: Uuid, session: &Session, credit: &PackageCredit) -> Self {
        Self {
            user_id,
            title: "Booking confirmed".into(),
            message: format!(
                "You are booked into {} on {}. {} session(s) left on {}.",
                session.title,
                session.start_time.format("%Y-%m-%d %H:%M UTC"),
                credit.sessions_remaining - 1,
                credit.package_name
            ),
            kind: NotificationKind::BookingConfirmed,
        }
    }

    pub fn booking_cancelled(user_id: Uuid, session: &Session) -> Self {
        Self {
            user_id,
            title: "Booking cancelled".into(),
            message: format!(
                "Your booking for {} on {} was cancelled and the session returned to your package.",
                session.title,
                session.start_time.format("%Y-%m-%d %H:%M UTC")
            ),
            kind: NotificationKind::BookingCancelled,
        }
    }

    pub fn session_cancelled(user_id: Uuid, session: &Session) -> Self {
        Self {
            user_id,
            title: "Session cancelled".into(),
            message: format!(
                "{} on {} has been cancelled. The session was returned to your package.",
                session.title,
                session.start_time.format("%Y-%m-%d %H:%M UTC")
            ),
            kind: NotificationKind::SessionCancelled,
        }
    }

    pub fn package_approved(user_id: Uuid, package: &Package) -> Self {
        Self {
            user_id,
            title: "Package approved".into(),
            message: format!(
                "Your request for {} was approved: {} session(s) added.",
                package.name, package.sessions_total
            ),
            kind: NotificationKind::PackageApproved,
        }
    }

    pub fn package_rejected(user_id: Uuid, package: &Package) -> Self {
        Self {
            user_id,
            title: "Package request declined".into(),
            message: format!("Your request for {} was declined.", package.name),
            kind: NotificationKind::PackageRejected,
        }
    }

    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind: self.kind.as_str().to_string(),
            is_read: false,
            created_at,
            read_at: None,
        }
    }
}
