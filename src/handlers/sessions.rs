use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Booking, NewSession, Session, SessionUpdate};
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::AppResult;
use crate::{directory, scheduling};

#[derive(Serialize)]
struct CancelledSession {
    session: Session,
    cancelled_bookings: Vec<Booking>,
}

pub async fn list_upcoming(State(state): State<AppState>) -> AppResult<Response> {
    let sessions =
        directory::or_empty(directory::upcoming_sessions(state.store.as_ref(), Utc::now()).await)?;
    Ok(success(sessions, "Upcoming sessions"))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<NewSession>,
) -> AppResult<Response> {
    let session = scheduling::create_session(state.store.as_ref(), &request, Utc::now()).await?;
    Ok(created(session, "Session scheduled"))
}

pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(update): Json<SessionUpdate>,
) -> AppResult<Response> {
    let session =
        scheduling::update_session(state.store.as_ref(), session_id, &update, Utc::now()).await?;
    Ok(success(session, "Session updated"))
}

pub async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Response> {
    let (session, cancelled_bookings) =
        scheduling::cancel_session(state.store.as_ref(), session_id, Utc::now()).await?;
    Ok(success(
        CancelledSession {
            session,
            cancelled_bookings,
        },
        "Session cancelled",
    ))
}
