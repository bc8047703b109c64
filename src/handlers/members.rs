use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::directory::{self, BookingOptions};
use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppResult;

pub async fn active_members(State(state): State<AppState>) -> AppResult<Response> {
    let members = directory::or_empty(
        directory::members_with_active_credits(state.store.as_ref(), Utc::now()).await,
    )?;
    Ok(success(members, "Members with active packages"))
}

pub async fn booking_options(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Response> {
    let options = directory::or_empty_with(
        directory::member_booking_options(state.store.as_ref(), member_id, Utc::now()).await,
        || BookingOptions::empty(member_id),
    )?;
    Ok(success(options, "Bookable sessions"))
}

pub async fn member_bookings(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Response> {
    let bookings = state.store.member_bookings(member_id).await?;
    Ok(success(bookings, "Member bookings"))
}
