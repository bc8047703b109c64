//! Session administration.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Booking, NewSession, Session, SessionUpdate};
use crate::store::GymStore;
use crate::utils::AppResult;

pub async fn create_session(
    store: &dyn GymStore,
    request: &NewSession,
    now: DateTime<Utc>,
) -> AppResult<Session> {
    request.validate()?;
    let session = store.insert_session(request, now).await?;
    tracing::info!(
        session_id = %session.id,
        package_type = %session.package_type,
        max_capacity = session.max_capacity,
        "Session scheduled"
    );
    Ok(session)
}

pub async fn update_session(
    store: &dyn GymStore,
    session_id: Uuid,
    update: &SessionUpdate,
    now: DateTime<Utc>,
) -> AppResult<Session> {
    let session = store.update_session(session_id, update, now).await?;
    tracing::info!(session_id = %session.id, "Session updated");
    Ok(session)
}

/// Cancels the session and every confirmed booking on it.
pub async fn cancel_session(
    store: &dyn GymStore,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<(Session, Vec<Booking>)> {
    store.cancel_session(session_id, now).await
}
