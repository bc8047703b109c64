use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod bookings;
pub mod members;
pub mod notifications;
pub mod package_requests;
pub mod reports;
pub mod sessions;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "gym-api",
    };

    success(payload, "Health check successful")
}
