use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Booking;
use crate::store::GymStore;
use crate::utils::AppResult;

/// `confirmed -> cancelled`; releases the seat and refunds the credit.
pub async fn cancel_booking(
    store: &dyn GymStore,
    booking_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Booking> {
    let booking = store.cancel_booking(booking_id, now).await?;
    tracing::info!(
        booking_id = %booking.id,
        session_id = %booking.session_id,
        credit_id = %booking.member_package_id,
        "Booking cancelled"
    );
    Ok(booking)
}

/// `confirmed -> attended`.
pub async fn mark_attended(store: &dyn GymStore, booking_id: Uuid) -> AppResult<Booking> {
    let booking = store.mark_attended(booking_id).await?;
    tracing::info!(booking_id = %booking.id, "Booking marked attended");
    Ok(booking)
}
