//! Persistence seam.
//!
//! Every multi-row write behind [`GymStore`] is atomic: either all of its
//! rows change or none do. Counters are only ever moved with conditional
//! updates evaluated by the store, never by writing back a value the
//! caller read earlier.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Booking, BookingCommit, EmailLog, Member, NewSession, Notification, Package, PackageCredit,
    PackageRequest, ReportSummary, RequestStatus, Session, SessionUpdate,
};
use crate::utils::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub sessions_completed: u64,
    pub credits_expired: u64,
}

#[async_trait]
pub trait GymStore: Send + Sync {
    // members and credits
    async fn find_member(&self, member_id: Uuid) -> AppResult<Option<Member>>;
    async fn members_by_ids(&self, member_ids: &[Uuid]) -> AppResult<Vec<Member>>;
    /// Usable credits ordered by purchase time, optionally for one member.
    async fn active_credits(
        &self,
        member_id: Option<Uuid>,
        today: NaiveDate,
    ) -> AppResult<Vec<PackageCredit>>;
    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<Package>>;

    // sessions
    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<Session>>;
    /// Scheduled sessions starting at or after `now` with a free seat,
    /// ordered by start time. `None` means every package type.
    async fn upcoming_sessions(
        &self,
        now: DateTime<Utc>,
        package_types: Option<&[String]>,
    ) -> AppResult<Vec<Session>>;
    async fn insert_session(&self, session: &NewSession, now: DateTime<Utc>) -> AppResult<Session>;
    async fn update_session(
        &self,
        session_id: Uuid,
        update: &SessionUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Session>;
    /// Cancels the session together with its confirmed bookings, refunding
    /// and notifying each member.
    async fn cancel_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(Session, Vec<Booking>)>;
    /// Completes elapsed sessions and expires credits past their expiry date.
    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome>;

    // bookings
    async fn commit_booking(&self, commit: BookingCommit) -> AppResult<Booking>;
    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>>;
    async fn member_bookings(&self, member_id: Uuid) -> AppResult<Vec<Booking>>;
    async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> AppResult<Booking>;
    async fn mark_attended(&self, booking_id: Uuid) -> AppResult<Booking>;

    // notifications
    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>>;
    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Notification>;

    // package requests
    async fn insert_package_request(
        &self,
        member_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest>;
    async fn package_requests(&self, status: Option<RequestStatus>)
        -> AppResult<Vec<PackageRequest>>;
    async fn approve_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(PackageRequest, PackageCredit)>;
    async fn reject_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest>;

    // email outbox
    /// Moves up to `limit` pending rows to `sending` and returns them, so
    /// concurrent dispatchers never receive the same row.
    async fn claim_pending_emails(&self, limit: i64) -> AppResult<Vec<EmailLog>>;
    async fn record_email_result(
        &self,
        email_id: Uuid,
        result: Result<(), String>,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<ReportSummary>;
}
