use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::booking::lifecycle;
use crate::models::BookingRequest;
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::AppResult;

pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> AppResult<Response> {
    let booking = state.committer.book(&request, Utc::now()).await?;
    Ok(created(booking, "Booking confirmed"))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Response> {
    let booking = lifecycle::cancel_booking(state.store.as_ref(), booking_id, Utc::now()).await?;
    Ok(success(booking, "Booking cancelled"))
}

pub async fn mark_attended(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Response> {
    let booking = lifecycle::mark_attended(state.store.as_ref(), booking_id).await?;
    Ok(success(booking, "Attendance recorded"))
}
