use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
pub struct BookingCounts {
    pub confirmed: i64,
    pub attended: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub members_with_active_credits: i64,
    pub upcoming_sessions: i64,
    pub bookings: BookingCounts,
    pub booked_seats: i64,
    pub total_capacity: i64,
    pub utilization: f64,
}

impl ReportSummary {
    pub fn utilization_of(booked_seats: i64, total_capacity: i64) -> f64 {
        if total_capacity == 0 {
            0.0
        } else {
            booked_seats as f64 / total_capacity as f64
        }
    }
}
