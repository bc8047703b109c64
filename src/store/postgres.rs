//! PostgreSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{GymStore, SweepOutcome};
use crate::models::{
    Booking, BookingCommit, BookingCounts, BookingStatus, EmailLog, Member, NewEmail,
    NewNotification, NewSession, Notification, Package, PackageCredit, PackageRequest,
    ReportSummary, RequestStatus, Session, SessionUpdate,
};
use crate::utils::{AppError, AppResult};

const MEMBER_SELECT: &str = "
    SELECT m.id, m.profile_id, p.full_name, p.email, m.phone, m.joined_at
    FROM members m
    JOIN profiles p ON p.id = m.profile_id";

const CREDIT_SELECT: &str = "
    SELECT mp.id, mp.member_id, mp.package_id, pk.name AS package_name, pk.package_type,
           mp.sessions_total, mp.sessions_remaining, mp.status, mp.purchased_at, mp.expiry_date
    FROM member_packages mp
    JOIN packages pk ON pk.id = mp.package_id";

const SESSION_COLUMNS: &str = "id, title, package_type, trainer_id, start_time, end_time, \
    max_capacity, current_bookings, status, created_at, updated_at";

const BOOKING_COLUMNS: &str =
    "id, member_id, session_id, member_package_id, status, booking_time, cancelled_at";

const REQUEST_COLUMNS: &str = "id, member_id, package_id, status, requested_at, resolved_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_session(conn: &mut PgConnection, session_id: Uuid) -> AppResult<Session> {
    sqlx::query_as::<_, Session>(&format!(
        "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1 FOR UPDATE"
    ))
    .bind(session_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Session", session_id))
}

async fn lock_booking(conn: &mut PgConnection, booking_id: Uuid) -> AppResult<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Booking", booking_id))
}

async fn profile_of(conn: &mut PgConnection, member_id: Uuid) -> AppResult<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT profile_id FROM members WHERE id = $1")
        .bind(member_id)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|(profile_id,)| profile_id)
        .ok_or_else(|| AppError::not_found("Member", member_id))
}

/// Gives one session back to a credit. An exhausted credit becomes active
/// again unless its expiry date has passed.
async fn refund_credit(
    conn: &mut PgConnection,
    credit_id: Uuid,
    today: NaiveDate,
) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE member_packages
        SET sessions_remaining = sessions_remaining + 1,
            status = CASE
                WHEN expiry_date IS NULL OR expiry_date >= $2 THEN 'active'::credit_status
                ELSE status
            END
        WHERE id = $1 AND sessions_remaining < sessions_total
        "#,
    )
    .bind(credit_id)
    .bind(today)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn insert_notification(
    conn: &mut PgConnection,
    notification: NewNotification,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, title, message, kind, is_read, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(notification.user_id)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.kind.as_str())
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn enqueue_email(
    conn: &mut PgConnection,
    email: NewEmail,
    now: DateTime<Utc>,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO email_logs (id, recipient, subject, body, status, created_at)
        VALUES ($1, $2, $3, $4, 'pending', $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email.recipient)
    .bind(&email.subject)
    .bind(&email.body)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn load_package(conn: &mut PgConnection, package_id: Uuid) -> AppResult<Package> {
    sqlx::query_as::<_, Package>(
        "SELECT id, name, package_type, sessions_total, price, validity_days, created_at
         FROM packages WHERE id = $1",
    )
    .bind(package_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Package", package_id))
}

async fn lock_pending_request(
    conn: &mut PgConnection,
    request_id: Uuid,
) -> AppResult<PackageRequest> {
    let request = sqlx::query_as::<_, PackageRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM package_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(request_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::not_found("Package request", request_id))?;
    request.ensure_pending()?;
    Ok(request)
}

async fn resolve_request(
    conn: &mut PgConnection,
    request_id: Uuid,
    status: RequestStatus,
    now: DateTime<Utc>,
) -> AppResult<PackageRequest> {
    let request = sqlx::query_as::<_, PackageRequest>(&format!(
        "UPDATE package_requests SET status = $2, resolved_at = $3
         WHERE id = $1
         RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(request_id)
    .bind(status)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(request)
}

fn booking_insert_error(err: sqlx::Error, member_id: Uuid, session_id: Uuid) -> AppError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::AlreadyBooked {
            member_id,
            session_id,
        },
        other => AppError::DatabaseError(other),
    }
}

#[async_trait]
impl GymStore for PgStore {
    async fn find_member(&self, member_id: Uuid) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(&format!("{MEMBER_SELECT} WHERE m.id = $1"))
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn members_by_ids(&self, member_ids: &[Uuid]) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>(&format!(
            "{MEMBER_SELECT} WHERE m.id = ANY($1) ORDER BY p.full_name, m.id"
        ))
        .bind(member_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn active_credits(
        &self,
        member_id: Option<Uuid>,
        today: NaiveDate,
    ) -> AppResult<Vec<PackageCredit>> {
        let credits = sqlx::query_as::<_, PackageCredit>(&format!(
            "{CREDIT_SELECT}
             WHERE mp.status = 'active'
               AND mp.sessions_remaining > 0
               AND (mp.expiry_date IS NULL OR mp.expiry_date >= $1)
               AND ($2::uuid IS NULL OR mp.member_id = $2)
             ORDER BY mp.purchased_at, mp.id"
        ))
        .bind(today)
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(credits)
    }

    async fn find_package(&self, package_id: Uuid) -> AppResult<Option<Package>> {
        let mut conn = self.pool.acquire().await?;
        match load_package(&mut conn, package_id).await {
            Ok(package) => Ok(Some(package)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn find_session(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn upcoming_sessions(
        &self,
        now: DateTime<Utc>,
        package_types: Option<&[String]>,
    ) -> AppResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE status = 'scheduled'
               AND start_time >= $1
               AND current_bookings < max_capacity
               AND ($2::text[] IS NULL OR package_type = ANY($2))
             ORDER BY start_time, id"
        ))
        .bind(now)
        .bind(package_types.map(|types| types.to_vec()))
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn insert_session(&self, session: &NewSession, now: DateTime<Utc>) -> AppResult<Session> {
        let created = sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (
                 id, title, package_type, trainer_id, start_time, end_time,
                 max_capacity, current_bookings, status, created_at, updated_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 'scheduled', $8, $8)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(session.title.trim())
        .bind(session.package_type.trim())
        .bind(session.trainer_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.max_capacity)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_session(
        &self,
        session_id: Uuid,
        update: &SessionUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Session> {
        let mut tx = self.pool.begin().await?;
        let mut session = lock_session(&mut tx, session_id).await?;
        session.apply(update, now)?;

        let updated = sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions
             SET title = $2, trainer_id = $3, start_time = $4, end_time = $5,
                 max_capacity = $6, updated_at = $7
             WHERE id = $1
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.id)
        .bind(&session.title)
        .bind(session.trainer_id)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.max_capacity)
        .bind(session.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn cancel_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(Session, Vec<Booking>)> {
        let mut tx = self.pool.begin().await?;
        let session = lock_session(&mut tx, session_id).await?;
        session.ensure_editable(now)?;

        let cancelled = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = $2
             WHERE session_id = $1 AND status = 'confirmed'
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(session_id)
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        let today = now.date_naive();
        for booking in &cancelled {
            refund_credit(&mut tx, booking.member_package_id, today).await?;
            let profile_id = profile_of(&mut tx, booking.member_id).await?;
            insert_notification(
                &mut tx,
                NewNotification::session_cancelled(profile_id, &session),
                now,
            )
            .await?;
        }

        let session = sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions
             SET status = 'cancelled', current_bookings = current_bookings - $2, updated_at = $3
             WHERE id = $1
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(cancelled.len() as i32)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(
            session_id = %session_id,
            bookings_cancelled = cancelled.len(),
            "Session cancelled"
        );
        Ok((session, cancelled))
    }

    async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome> {
        let sessions_completed = sqlx::query(
            "UPDATE sessions SET status = 'completed', updated_at = $1
             WHERE status = 'scheduled' AND end_time < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        let credits_expired = sqlx::query(
            "UPDATE member_packages SET status = 'expired'
             WHERE status = 'active' AND expiry_date < $1",
        )
        .bind(now.date_naive())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(SweepOutcome {
            sessions_completed,
            credits_expired,
        })
    }

    async fn commit_booking(&self, commit: BookingCommit) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let seat = sqlx::query(
            r#"
            UPDATE sessions
            SET current_bookings = current_bookings + 1, updated_at = $2
            WHERE id = $1 AND status = 'scheduled' AND current_bookings < max_capacity
            "#,
        )
        .bind(commit.session_id)
        .bind(commit.booked_at)
        .execute(&mut *tx)
        .await?;
        if seat.rows_affected() == 0 {
            return Err(AppError::CapacityExceeded(commit.session_id));
        }

        let debit = sqlx::query(
            r#"
            UPDATE member_packages
            SET sessions_remaining = sessions_remaining - 1,
                status = CASE
                    WHEN sessions_remaining - 1 = 0 THEN 'expired'::credit_status
                    ELSE status
                END
            WHERE id = $1 AND member_id = $2 AND status = 'active' AND sessions_remaining > 0
            "#,
        )
        .bind(commit.credit_id)
        .bind(commit.member_id)
        .execute(&mut *tx)
        .await?;
        if debit.rows_affected() == 0 {
            return Err(AppError::CreditExhausted(commit.credit_id));
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (
                 id, member_id, session_id, member_package_id, status, booking_time
             )
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(commit.booking_id)
        .bind(commit.member_id)
        .bind(commit.session_id)
        .bind(commit.credit_id)
        .bind(BookingStatus::Confirmed)
        .bind(commit.booked_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| booking_insert_error(e, commit.member_id, commit.session_id))?;

        insert_notification(&mut tx, commit.notification, commit.booked_at).await?;
        enqueue_email(&mut tx, commit.email, commit.booked_at).await?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn find_booking(&self, booking_id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn member_bookings(&self, member_id: Uuid) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE member_id = $1
             ORDER BY booking_time DESC, id"
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;
        let booking = lock_booking(&mut tx, booking_id).await?;
        booking.status.ensure_transition(BookingStatus::Cancelled)?;

        let session = lock_session(&mut tx, booking.session_id).await?;
        session.ensure_editable(now)?;

        let cancelled = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = $2
             WHERE id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE sessions SET current_bookings = current_bookings - 1, updated_at = $2
             WHERE id = $1 AND current_bookings > 0",
        )
        .bind(session.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        refund_credit(&mut tx, booking.member_package_id, now.date_naive()).await?;
        let profile_id = profile_of(&mut tx, booking.member_id).await?;
        insert_notification(
            &mut tx,
            NewNotification::booking_cancelled(profile_id, &session),
            now,
        )
        .await?;

        tx.commit().await?;
        Ok(cancelled)
    }

    async fn mark_attended(&self, booking_id: Uuid) -> AppResult<Booking> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = 'attended'
             WHERE id = $1 AND status = 'confirmed'
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(booking),
            None => {
                let current = self
                    .find_booking(booking_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Booking", booking_id))?;
                current.status.ensure_transition(BookingStatus::Attended)?;
                Err(AppError::InvalidState(format!(
                    "booking {} changed concurrently",
                    booking_id
                )))
            }
        }
    }

    async fn notifications_for(&self, user_id: Uuid) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, message, kind, is_read, created_at, read_at
             FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $2)
             WHERE id = $1
             RETURNING id, user_id, title, message, kind, is_read, created_at, read_at",
        )
        .bind(notification_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Notification", notification_id))
    }

    async fn insert_package_request(
        &self,
        member_id: Uuid,
        package_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest> {
        let request = sqlx::query_as::<_, PackageRequest>(&format!(
            "INSERT INTO package_requests (id, member_id, package_id, status, requested_at)
             VALUES ($1, $2, $3, 'pending', $4)
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(package_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn package_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<PackageRequest>> {
        let requests = sqlx::query_as::<_, PackageRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM package_requests
             WHERE ($1::request_status IS NULL OR status = $1)
             ORDER BY requested_at, id"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn approve_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<(PackageRequest, PackageCredit)> {
        let mut tx = self.pool.begin().await?;
        let request = lock_pending_request(&mut tx, request_id).await?;
        let package = load_package(&mut tx, request.package_id).await?;
        let profile_id = profile_of(&mut tx, request.member_id).await?;

        let credit_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO member_packages (
                id, member_id, package_id, sessions_total, sessions_remaining,
                status, purchased_at, expiry_date
            )
            VALUES ($1, $2, $3, $4, $4, 'active', $5, $6)
            "#,
        )
        .bind(credit_id)
        .bind(request.member_id)
        .bind(package.id)
        .bind(package.sessions_total)
        .bind(now)
        .bind(package.expiry_from(now.date_naive()))
        .execute(&mut *tx)
        .await?;

        let credit =
            sqlx::query_as::<_, PackageCredit>(&format!("{CREDIT_SELECT} WHERE mp.id = $1"))
                .bind(credit_id)
                .fetch_one(&mut *tx)
                .await?;

        let request = resolve_request(&mut tx, request_id, RequestStatus::Approved, now).await?;
        insert_notification(&mut tx, NewNotification::package_approved(profile_id, &package), now)
            .await?;

        tx.commit().await?;
        Ok((request, credit))
    }

    async fn reject_package_request(
        &self,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PackageRequest> {
        let mut tx = self.pool.begin().await?;
        let request = lock_pending_request(&mut tx, request_id).await?;
        let package = load_package(&mut tx, request.package_id).await?;
        let profile_id = profile_of(&mut tx, request.member_id).await?;

        let request = resolve_request(&mut tx, request_id, RequestStatus::Rejected, now).await?;
        insert_notification(&mut tx, NewNotification::package_rejected(profile_id, &package), now)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn claim_pending_emails(&self, limit: i64) -> AppResult<Vec<EmailLog>> {
        let mut emails = sqlx::query_as::<_, EmailLog>(
            "UPDATE email_logs SET status = 'sending'
             WHERE id IN (
                 SELECT id FROM email_logs
                 WHERE status = 'pending'
                 ORDER BY created_at, id
                 LIMIT $1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING id, recipient, subject, body, status, error, created_at, sent_at",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        // RETURNING carries no order.
        emails.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(emails)
    }

    async fn record_email_result(
        &self,
        email_id: Uuid,
        result: Result<(), String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        match result {
            Ok(()) => {
                sqlx::query(
                    "UPDATE email_logs SET status = 'sent', sent_at = $2, error = NULL
                     WHERE id = $1",
                )
                .bind(email_id)
                .bind(now)
                .execute(&self.pool)
                .await?;
            }
            Err(reason) => {
                sqlx::query("UPDATE email_logs SET status = 'failed', error = $2 WHERE id = $1")
                    .bind(email_id)
                    .bind(reason)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    async fn summary(&self, now: DateTime<Utc>) -> AppResult<ReportSummary> {
        let (members_with_active_credits,): (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT member_id) FROM member_packages
             WHERE status = 'active'
               AND sessions_remaining > 0
               AND (expiry_date IS NULL OR expiry_date >= $1)",
        )
        .bind(now.date_naive())
        .fetch_one(&self.pool)
        .await?;

        let (upcoming_sessions, booked_seats, total_capacity): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(SUM(current_bookings), 0)::BIGINT,
                    COALESCE(SUM(max_capacity), 0)::BIGINT
             FROM sessions
             WHERE status = 'scheduled' AND start_time >= $1",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        let bookings = sqlx::query_as::<_, BookingCounts>(
            "SELECT COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed,
                    COUNT(*) FILTER (WHERE status = 'attended') AS attended,
                    COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
             FROM bookings",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ReportSummary {
            members_with_active_credits,
            upcoming_sessions,
            bookings,
            booked_seats,
            total_capacity,
            utilization: ReportSummary::utilization_of(booked_seats, total_capacity),
        })
    }
}
