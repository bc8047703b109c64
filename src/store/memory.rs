//! In-process backend for tests and local development.
//!
//! One mutex guards the whole state, so every trait method observes and
//! mutates a consistent snapshot, mirroring the transactional guarantees
//! of the PostgreSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{GymStore, SweepOutcome};
use crate::models::{
    Booking, BookingCommit, BookingCounts, BookingStatus, CreditStatus, EmailLog, EmailStatus,
    Member, NewNotification, NewSession, Notification, Package, PackageCredit, PackageRequest,
    ReportSummary, RequestStatus, Session, SessionStatus, SessionUpdate,
};
use crate::utils::{AppError, AppResult};

#[derive(Default)]
struct State {
    members: Vec<Member>,
    packages: Vec<Package>,
    credits: Vec<PackageCredit>,
    sessions: Vec<Session>,
    bookings: Vec<Booking>,
    notifications: Vec<Notification>,
    requests: Vec<PackageRequest>,
    emails: Vec<EmailLog>,
}

impl State {
    fn session_mut(&mut self, session_id: Uuid) -> AppResult<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| AppError::not_found("Session", session_id))
    }

    fn credit_mut(&mut self, credit_id: Uuid) -> AppResult<&mut PackageCredit> {
        self.credits
            .iter_mut()
            .find(|c| c.id == credit_id)
            .ok_or_else(|| AppError::not_found("Package credit", credit_id))
    }

    fn booking_mut(&mut self, booking_id: Uuid) -> AppResult<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| AppError::not_found("Booking", booking_id))
    }

    fn request_mut(&mut self, request_id: Uuid) -> AppResult<&mut PackageRequest> {
        self.requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| AppError::not_found("Package request", request_id))
    }

    fn package(&self, package_id: Uuid) -> AppResult<&Package> {
        self.packages
            .iter()
            .find(|p| p.id == package_id)
            .ok_or_else(|| AppError::not_found("Package", package_id))
    }

    fn profile_of(&self, member_id: Uuid) -> AppResult<Uuid> {
        self.members
            .iter()
            .find(|m| m.id == member_id)
            .map(|m| m.profile_id)
            .ok_or_else(|| AppError::not_found("Member", member_id))
    }

    fn refund_credit(&mut self, credit_id: Uuid, today: NaiveDate) -> AppResult<()> {
        let credit = self.credit_mut(credit_id)?;
        if credit.sessions_remaining < credit.sessions_total {
            credit.sessions_remaining += 1;
            if !credit.is_expired_on(today) {
                credit.status = CreditStatus::Active;
            }
        }
        Ok(())
    }

    fn notify(&mut self, notification: NewNotification, now: DateTime<Utc>) {
        self.notifications
            .push(notification.into_row(Uuid::new_v4(), now));
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a profile-backed member.
    pub async fn add_member(&self, full_name: &str, email: &str, phone: Option<&str>) -> Member {
        let member = Member {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
            joined_at: Utc::now(),
        };
        self.state.lock().await.members.push(member.clone());
        member
    }

    pub async fn add_package(
        &self,
        name: &str,
        package_type: &str,
        sessions_total: i32,
        price: Decimal,
        validity_days: Option<i32>,
    ) -> Package {
        let package = Package {
            id: Uuid::new_v4(),
            name: name.to_string(),
            package_type: package_type.to_string(),
            sessions_total,
            price,
            validity_days,
            created_at: Utc::now(),
        };
        self.state.lock().await.packages.push(package.clone());
        package
    }

    /// Grants a credit directly, with an explicit remaining count.
    pub async fn grant_credit(
        &self,
        member_id: Uuid,
        package_id: Uuid,
        sessions_remaining: i32,
        expiry_date: Option<NaiveDate>,
    ) -> AppResult<PackageCredit> {
        let mut state = self.state.lock().await;
        state.profile_of(member_id)?;
        let package = state.package(package_id)?.clone();
        let credit = PackageCredit {
            id: Uuid::new_v4(),
            member_id,
            package_id,
            package_name: package.name,
            package_type: package.package_type,
            sessions_total: package.sessions_total,
            sessions_remaining,
            status: if sessions_remaining > 0 {
                CreditStatus::Active
            } else {
                CreditStatus::Expired
            },
            purchased_at: Utc::now(),
            expiry_date,
        };
        state.credits.push(credit.clone());
        Ok(credit)
    }

    pub async fn credit(&self, credit_id: Uuid) -> Option<PackageCredit> {
        let state = self.state.lock().await;
        state.credits.iter().find(|c| c.id == credit_id).cloned()
    }

    pub async fn session_bookings(&self, session_id: Uuid) -> Vec<Booking> {
        let state = self.state.lock().await;
        state
            .bookings
            .iter()
            .filter(|b| b.session_id == session_id)
            .cloned()
            .collect()
    }

    pub async fn emails(&self) -> Vec<EmailLog> {
        self.state.lock().await.emails.clone()
    }
}

#[async_trait]
impl GymStore for MemoryStore {
    async fn find_member(&self, member_id: Uuid) -> AppResult<Option<Member>> {
        let state = self.state.lock().await;
        Ok(state.members.iter().find(|m| m.id == member_id).cloned())
    }

    async fn members_by_ids(&self, member_ids: &[Uuid]) -> AppResult<Vec<Member>> {
        let state = self.state.lock().await;
        let mut members: Vec<Member> = state
            .members
            .iter()
            .filter(|m| member_ids.contains(&m.id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn active_credits(
        &self,
        member_id: Option<Uuid>,
        today: NaiveDate,
    ) -> AppResult<Vec<PackageCredit>> {
        let state = self.state.lock().await;
        let mut credits: Vec<PackageCredit> = state
            .credits
            .iter()
            .filter(|c| member_id.map_or(true, |id| c.member_id == id))
            .filter(|c| c.is_usable_on(today))
            .cloned()
            .collect();
        credits.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));
        Ok(credits)
    }

    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<Package>> {
        let state = self.state.lock().await;
        Ok(state.packages.iter().find(|p| p.id == package_id).cloned())
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        let state = self.state.lock().await;
        Ok(state.sessions.iter().find(|s| s.id == session_id).cloned())
    }

    async fn upcoming_sessions(
        &self,
        now: DateTime<Utc>,
        package_types: Option<&[String]>,
    ) -> AppResult<Vec<Session>> {
        let state = self.state.lock().await;
        let mut sessions: Vec<Session> = state
            .sessions
            .iter()
            .filter(|s| s.is_bookable(now) && s.has_open_capacity())
            .filter(|s| package_types.map_or(true, |types| types.contains(&s.package_type)))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(sessions)
    }

    async fn insert_session(&self, session: &NewSession, now: DateTime<Utc>) -> AppResult<Session> {
        let created = Session {
            id: Uuid::new_v4(),
            title: session.title.trim().to_string(),
            package_type: session.package_type.trim().to_string(),
            trainer_id: session.trainer_id,
            start_time: session.start_time,
            end_time: session.end_time,
            max_capacity: session.max_capacity,
            current_bookings: 0,
            status: SessionStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.sessions.push(created.clone());
        Ok(created)
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        update: &SessionUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Session> {
        let mut state = self.state.lock().await;
        let stored = state.session_mut(session_id)?;
        let mut session = stored.clone();
        session.apply(update, now)?;
        *stored = session.clone();
        Ok(session)
    }

    async fn cancel_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(Session, Vec<Booking>)> {
        let mut state = self.state.lock().await;
        let session = state.session_mut(session_id)?.clone();
        session.ensure_editable(now)?;

        let mut cancelled = Vec::new();
        for booking in state.bookings.iter_mut() {
            if booking.session_id == session_id && booking.status == BookingStatus::Confirmed {
                booking.status = BookingStatus::Cancelled;
                booking.cancelled_at = Some(now);
                cancelled.push(booking.clone());
            }
        }

        let today = now.date_naive();
        for booking in &cancelled {
            state.refund_credit(booking.member_package_id, today)?;
            let profile_id = state.profile_of(booking.member_id)?;
            state.notify(NewNotification::session_cancelled(profile_id, &session), now);
        }

        let stored = state.session_mut(session_id)?;
        stored.status = SessionStatus::Cancelled;
        stored.current_bookings -= cancelled.len() as i32;
        stored.updated_at = now;
        Ok((stored.clone(), cancelled))
    }

    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome> {
        let mut state = self.state.lock().await;
        let mut outcome = SweepOutcome::default();
        for session in state.sessions.iter_mut().filter(|s| s.is_elapsed(now)) {
            session.status = SessionStatus::Completed;
            session.updated_at = now;
            outcome.sessions_completed += 1;
        }
        let today = now.date_naive();
        for credit in state
            .credits
            .iter_mut()
            .filter(|c| c.status == CreditStatus::Active && c.is_expired_on(today))
        {
            credit.status = CreditStatus::Expired;
            outcome.credits_expired += 1;
        }
        Ok(outcome)
    }

    async fn commit_booking(&self, commit: BookingCommit) -> AppResult<Booking> {
        let mut state = self.state.lock().await;

        // Validate every step before mutating so a rejection leaves no trace.
        {
            let session = state.session_mut(commit.session_id)?;
            if session.status != SessionStatus::Scheduled || !session.has_open_capacity() {
                return Err(AppError::CapacityExceeded(commit.session_id));
            }
        }
        {
            let credit = state.credit_mut(commit.credit_id)?;
            if credit.member_id != commit.member_id
                || credit.status != CreditStatus::Active
                || credit.sessions_remaining <= 0
            {
                return Err(AppError::CreditExhausted(commit.credit_id));
            }
        }
        let duplicate = state.bookings.iter().any(|b| {
            b.member_id == commit.member_id
                && b.session_id == commit.session_id
                && b.status != BookingStatus::Cancelled
        });
        if duplicate {
            return Err(AppError::AlreadyBooked {
                member_id: commit.member_id,
                session_id: commit.session_id,
            });
        }

        let session = state.session_mut(commit.session_id)?;
        session.current_bookings += 1;
        session.updated_at = commit.booked_at;

        let credit = state.credit_mut(commit.credit_id)?;
        credit.sessions_remaining -= 1;
        if credit.sessions_remaining == 0 {
            credit.status = CreditStatus::Expired;
        }

        let booking = Booking {
            id: commit.booking_id,
            member_id: commit.member_id,
            session_id: commit.session_id,
            member_package_id: commit.credit_id,
            status: BookingStatus::Confirmed,
            booking_time: commit.booked_at,
            cancelled_at: None,
        };
        state.bookings.push(booking.clone());
        state.notify(commit.notification, commit.booked_at);
        state
            .emails
            .push(commit.email.into_row(Uuid::new_v4(), commit.booked_at));
        Ok(booking)
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let state = self.state.lock().await;
        Ok(state.bookings.iter().find(|b| b.id == booking_id).cloned())
    }

    async fn member_bookings(&self, member_id: Uuid) -> AppResult<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| b.member_id == member_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booking_time.cmp(&a.booking_time).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> AppResult<Booking> {
        let mut state = self.state.lock().await;
        let booking = state.booking_mut(booking_id)?.clone();
        booking.status.ensure_transition(BookingStatus::Cancelled)?;
        let session = state.session_mut(booking.session_id)?.clone();
        session.ensure_editable(now)?;
        let profile_id = state.profile_of(booking.member_id)?;

        let stored = state.booking_mut(booking_id)?;
        stored.status = BookingStatus::Cancelled;
        stored.cancelled_at = Some(now);
        let cancelled = stored.clone();

        let stored_session = state.session_mut(session.id)?;
        if stored_session.current_bookings > 0 {
            stored_session.current_bookings -= 1;
            stored_session.updated_at = now;
        }
        state.refund_credit(booking.member_package_id, now.date_naive())?;
        state.notify(NewNotification::booking_cancelled(profile_id, &session), now);
        Ok(cancelled)
    }

    async fn mark_attended(&self, booking_id: Uuid) -> AppResult<Booking> {
        let mut state = self.state.lock().await;
        let booking = state.booking_mut(booking_id)?;
        booking.status.ensure_transition(BookingStatus::Attended)?;
        booking.status = BookingStatus::Attended;
        Ok(booking.clone())
    }

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let state = self.state.lock().await;
        let mut notifications: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Notification> {
        let mut state = self.state.lock().await;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| AppError::not_found("Notification", notification_id))?;
        notification.is_read = true;
        if notification.read_at.is_none() {
            notification.read_at = Some(now);
        }
        Ok(notification.clone())
    }

    async fn insert_package_request(
        &self,
        member_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest> {
        let mut state = self.state.lock().await;
        state.profile_of(member_id)?;
        state.package(package_id)?;
        let request = PackageRequest {
            id: Uuid::new_v4(),
            member_id,
            package_id,
            status: RequestStatus::Pending,
            requested_at: now,
            resolved_at: None,
        };
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn package_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<PackageRequest>> {
        let state = self.state.lock().await;
        let mut requests: Vec<PackageRequest> = state
            .requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.requested_at.cmp(&b.requested_at).then(a.id.cmp(&b.id)));
        Ok(requests)
    }

    async fn approve_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(PackageRequest, PackageCredit)> {
        let mut state = self.state.lock().await;
        let request = state.request_mut(request_id)?.clone();
        request.ensure_pending()?;
        let package = state.package(request.package_id)?.clone();
        let profile_id = state.profile_of(request.member_id)?;

        let credit = PackageCredit {
            id: Uuid::new_v4(),
            member_id: request.member_id,
            package_id: package.id,
            package_name: package.name.clone(),
            package_type: package.package_type.clone(),
            sessions_total: package.sessions_total,
            sessions_remaining: package.sessions_total,
            status: CreditStatus::Active,
            purchased_at: now,
            expiry_date: package.expiry_from(now.date_naive()),
        };
        state.credits.push(credit.clone());

        let stored = state.request_mut(request_id)?;
        stored.status = RequestStatus::Approved;
        stored.resolved_at = Some(now);
        let resolved = stored.clone();

        state.notify(NewNotification::package_approved(profile_id, &package), now);
        Ok((resolved, credit))
    }

    async fn reject_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest> {
        let mut state = self.state.lock().await;
        let request = state.request_mut(request_id)?.clone();
        request.ensure_pending()?;
        let package = state.package(request.package_id)?.clone();
        let profile_id = state.profile_of(request.member_id)?;

        let stored = state.request_mut(request_id)?;
        stored.status = RequestStatus::Rejected;
        stored.resolved_at = Some(now);
        let resolved = stored.clone();

        state.notify(NewNotification::package_rejected(profile_id, &package), now);
        Ok(resolved)
    }

    async fn claim_pending_emails(&self, limit: i64) -> AppResult<Vec<EmailLog>> {
        let mut state = self.state.lock().await;
        let mut pending: Vec<&mut EmailLog> = state
            .emails
            .iter_mut()
            .filter(|e| e.status == EmailStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|email| {
                email.status = EmailStatus::Sending;
                email.clone()
            })
            .collect())
    }

    async fn record_email_result(
        &self,
        email_id: Uuid,
        result: Result<(), String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let email = state
            .emails
            .iter_mut()
            .find(|e| e.id == email_id)
            .ok_or_else(|| AppError::not_found("Email", email_id))?;
        match result {
            Ok(()) => {
                email.status = EmailStatus::Sent;
                email.sent_at = Some(now);
                email.error = None;
            }
            Err(reason) => {
                email.status = EmailStatus::Failed;
                email.error = Some(reason);
            }
        }
        Ok(())
    }

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<ReportSummary> {
        let state = self.state.lock().await;
        let today = now.date_naive();

        let mut members: Vec<Uuid> = state
            .credits
            .iter()
            .filter(|c| c.is_usable_on(today))
            .map(|c| c.member_id)
            .collect();
        members.sort();
        members.dedup();

        let upcoming: Vec<&Session> = state
            .sessions
            .iter()
            .filter(|s| s.is_bookable(now))
            .collect();
        let booked_seats: i64 = upcoming.iter().map(|s| s.current_bookings as i64).sum();
        let total_capacity: i64 = upcoming.iter().map(|s| s.max_capacity as i64).sum();

        let mut bookings = BookingCounts::default();
        for booking in &state.bookings {
            match booking.status {
                BookingStatus::Confirmed => bookings.confirmed += 1,
                BookingStatus::Attended => bookings.attended += 1,
                BookingStatus::Cancelled => bookings.cancelled += 1,
            }
        }

        Ok(ReportSummary {
            members_with_active_credits: members.len() as i64,
            upcoming_sessions: upcoming.len() as i64,
            bookings,
            booked_seats,
            total_capacity,
            utilization: ReportSummary::utilization_of(booked_seats, total_capacity),
        })
    }
}
