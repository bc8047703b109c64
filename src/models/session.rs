use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub title: String,
    pub package_type: String,
    pub trainer_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn has_open_capacity(&self) -> bool {
        self.current_bookings < self.max_capacity
    }

    /// Scheduled sessions whose end has passed are due for completion.
    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Scheduled && self.end_time < now
    }

    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Scheduled && self.start_time >= now
    }

    /// A session can change only while scheduled and not yet over, whether
    /// or not the sweep has recorded its completion.
    pub fn ensure_editable(&self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_elapsed(now) {
            return Err(AppError::InvalidState(format!(
                "session {} ended at {} and can no longer be changed",
                self.id, self.end_time
            )));
        }
        match self.status {
            SessionStatus::Scheduled => Ok(()),
            status => Err(AppError::InvalidState(format!(
                "session {} is {:?} and can no longer be changed",
                self.id, status
            ))),
        }
    }

    /// Applies an update in memory, validating the resulting shape.
    pub fn apply(&mut self, update: &SessionUpdate, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_editable(now)?;
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(trainer_id) = update.trainer_id {
            self.trainer_id = Some(trainer_id);
        }
        if let Some(start_time) = update.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            self.end_time = end_time;
        }
        if let Some(max_capacity) = update.max_capacity {
            if max_capacity < self.current_bookings {
                return Err(AppError::ValidationError(format!(
                    "max_capacity {} is below the {} seats already booked",
                    max_capacity, self.current_bookings
                )));
            }
            self.max_capacity = max_capacity;
        }
        validate_shape(
            &self.title,
            &self.package_type,
            self.start_time,
            self.end_time,
            self.max_capacity,
        )?;
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSession {
    pub title: String,
    pub package_type: String,
    pub trainer_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: i32,
}

impl NewSession {
    pub fn validate(&self) -> AppResult<()> {
        validate_shape(
            &self.title,
            &self.package_type,
            self.start_time,
            self.end_time,
            self.max_capacity,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionUpdate {
    pub title: Option<String>,
    pub trainer_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub max_capacity: Option<i32>,
}

fn validate_shape(
    title: &str,
    package_type: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_capacity: i32,
) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("title is required".into()));
    }
    if package_type.trim().is_empty() {
        return Err(AppError::ValidationError("package_type is required".into()));
    }
    if end_time <= start_time {
        return Err(AppError::ValidationError(
            "end_time must be after start_time".into(),
        ));
    }
    if max_capacity <= 0 {
        return Err(AppError::ValidationError(
            "max_capacity must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(status: SessionStatus, booked: i32) -> Session {
        let start = Utc::now() + Duration::hours(2);
        Session {
            id: Uuid::new_v4(),
            title: "Morning HIIT".into(),
            package_type: "Group Class".into(),
            trainer_id: None,
            start_time: start,
            end_time: start + Duration::hours(1),
            max_capacity: 10,
            current_bookings: booked,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_session_rejects_inverted_times() {
        let now = Utc::now();
        let req = NewSession {
            title: "Spin".into(),
            package_type: "Group Class".into(),
            trainer_id: None,
            start_time: now,
            end_time: now - Duration::minutes(5),
            max_capacity: 12,
        };
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn completed_session_cannot_be_edited() {
        let mut s = session(SessionStatus::Completed, 0);
        let update = SessionUpdate {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(matches!(
            s.apply(&update, Utc::now()),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn capacity_cannot_drop_below_bookings() {
        let mut s = session(SessionStatus::Scheduled, 6);
        let update = SessionUpdate {
            max_capacity: Some(5),
            ..Default::default()
        };
        assert!(s.apply(&update, Utc::now()).is_err());

        let update = SessionUpdate {
            max_capacity: Some(6),
            ..Default::default()
        };
        s.apply(&update, Utc::now()).unwrap();
        assert!(!s.has_open_capacity());
    }

    #[test]
    fn ended_session_is_frozen_before_sweep() {
        let mut s = session(SessionStatus::Scheduled, 1);
        let after_end = s.end_time + Duration::minutes(1);
        assert!(s.ensure_editable(s.start_time).is_ok());
        assert!(matches!(
            s.ensure_editable(after_end),
            Err(AppError::InvalidState(_))
        ));
        let update = SessionUpdate {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(s.apply(&update, after_end).is_err());
        assert_ne!(s.title, "Renamed");
    }

    #[test]
    fn elapsed_only_applies_to_scheduled() {
        let mut s = session(SessionStatus::Scheduled, 0);
        let later = s.end_time + Duration::minutes(1);
        assert!(s.is_elapsed(later));
        s.status = SessionStatus::Cancelled;
        assert!(!s.is_elapsed(later));
    }
}
