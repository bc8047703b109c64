use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    bookings, health_check, members, notifications, package_requests, reports, sessions,
};
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/members/active", get(members::active_members))
        .route("/members/:member_id/booking-options", get(members::booking_options))
        .route("/members/:member_id/bookings", get(members::member_bookings))
        .route(
            "/sessions",
            get(sessions::list_upcoming).post(sessions::create_session),
        )
        .route("/sessions/:session_id", patch(sessions::update_session))
        .route("/sessions/:session_id/cancel", post(sessions::cancel_session))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/:booking_id/cancel", post(bookings::cancel_booking))
        .route("/bookings/:booking_id/attend", post(bookings::mark_attended))
        .route("/users/:user_id/notifications", get(notifications::list_for_user))
        .route(
            "/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
        .route(
            "/package-requests",
            get(package_requests::list_requests).post(package_requests::create_request),
        )
        .route(
            "/package-requests/:request_id/approve",
            post(package_requests::approve_request),
        )
        .route(
            "/package-requests/:request_id/reject",
            post(package_requests::reject_request),
        )
        .route("/reports/summary", get(reports::summary))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config))
        .layer(create_cors_layer(config))
}
