//! HTTP surface tests, driving the router in-process.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use gym_server::config::Config;
use gym_server::models::{Member, NewSession, Package, Session};
use gym_server::routes::create_routes;
use gym_server::state::AppState;
use gym_server::store::{GymStore, MemoryStore};

const PT: &str = "Personal Training";

fn app(store: Arc<MemoryStore>) -> Router {
    let config = Config::from_lookup(|_| None);
    create_routes(AppState::new(store, &config), &config)
}

async fn extract_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn send_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

struct Seeded {
    store: Arc<MemoryStore>,
    member: Member,
    package: Package,
    session: Session,
}

/// One member holding a single personal-training credit, and a
/// one-seat session tomorrow.
async fn seeded(remaining: i32) -> Seeded {
    let store = Arc::new(MemoryStore::new());
    let member = store.add_member("Ana", "ana@example.com", Some("555-0100")).await;
    let package = store
        .add_package("PT single", PT, 1, Decimal::new(4500, 2), None)
        .await;
    store
        .grant_credit(member.id, package.id, remaining, None)
        .await
        .unwrap();
    let start = Utc::now() + Duration::days(1);
    let session = store
        .insert_session(
            &NewSession {
                title: "Strength 1:1".into(),
                package_type: PT.into(),
                trainer_id: None,
                start_time: start,
                end_time: start + Duration::hours(1),
                max_capacity: 1,
            },
            Utc::now(),
        )
        .await
        .unwrap();
    Seeded {
        store,
        member,
        package,
        session,
    }
}

fn booking_body(seeded: &Seeded) -> Value {
    json!({ "member_id": seeded.member.id, "session_id": seeded.session.id })
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let response = app(Arc::new(MemoryStore::new()))
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().get("strict-transport-security").is_none());

    let body = extract_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn booking_is_created_and_seat_taken() {
    let seeded = seeded(1).await;
    let app = app(seeded.store.clone());

    let response = app
        .clone()
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["session_id"], seeded.session.id.to_string());

    let session = seeded.store.find_session(seeded.session.id).await.unwrap().unwrap();
    assert_eq!(session.current_bookings, 1);

    // The full session no longer shows up for anyone.
    let listed = extract_json(app.clone().oneshot(get("/api/sessions")).await.unwrap()).await;
    assert_eq!(listed["data"], json!([]));

    let uri = format!("/api/members/{}/bookings", seeded.member.id);
    let bookings = extract_json(app.oneshot(get(&uri)).await.unwrap()).await;
    assert_eq!(bookings["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn exhausted_credit_is_reported_as_conflict() {
    let seeded = seeded(0).await;

    let response = app(seeded.store.clone())
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NO_ELIGIBLE_PACKAGE");
    assert!(seeded.store.session_bookings(seeded.session.id).await.is_empty());
}

#[tokio::test]
async fn second_booking_on_full_session_is_capacity_exceeded() {
    let seeded = seeded(1).await;
    let ben = seeded.store.add_member("Ben", "ben@example.com", None).await;
    seeded
        .store
        .grant_credit(ben.id, seeded.package.id, 1, None)
        .await
        .unwrap();
    let app = app(seeded.store.clone());

    let first = app
        .clone()
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(send_json(
            Method::POST,
            "/api/bookings",
            json!({ "member_id": ben.id, "session_id": seeded.session.id }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = extract_json(second).await;
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");
    assert_eq!(body["error"]["details"]["session_id"], seeded.session.id.to_string());
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let seeded = seeded(1).await;

    let response = app(seeded.store.clone())
        .oneshot(send_json(
            Method::POST,
            "/api/bookings",
            json!({ "member_id": seeded.member.id, "session_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(extract_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn booking_options_list_matching_sessions() {
    let seeded = seeded(1).await;
    let uri = format!("/api/members/{}/booking-options", seeded.member.id);

    let response = app(seeded.store.clone()).oneshot(get(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["data"]["credits"][0]["package_type"], PT);
    assert_eq!(body["data"]["credits"][0]["sessions_remaining"], 1);
    assert_eq!(body["data"]["sessions"][0]["id"], seeded.session.id.to_string());
}

#[tokio::test]
async fn active_members_include_credit_holders() {
    let seeded = seeded(1).await;
    seeded.store.add_member("Cai", "cai@example.com", None).await;

    let response = app(seeded.store.clone())
        .oneshot(get("/api/members/active"))
        .await
        .unwrap();

    let body = extract_json(response).await;
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["full_name"], "Ana");
    assert_eq!(members[0]["credits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn session_with_inverted_times_is_rejected() {
    let start = Utc::now() + Duration::days(2);
    let response = app(Arc::new(MemoryStore::new()))
        .oneshot(send_json(
            Method::POST,
            "/api/sessions",
            json!({
                "title": "Backwards",
                "package_type": PT,
                "start_time": start.to_rfc3339(),
                "end_time": (start - Duration::hours(1)).to_rfc3339(),
                "max_capacity": 4,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extract_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn session_lifecycle_over_http() {
    let store = Arc::new(MemoryStore::new());
    let app = app(store.clone());
    let start = Utc::now() + Duration::days(3);

    let created = app
        .clone()
        .oneshot(send_json(
            Method::POST,
            "/api/sessions",
            json!({
                "title": "Morning flow",
                "package_type": "Yoga",
                "start_time": start.to_rfc3339(),
                "end_time": (start + Duration::hours(1)).to_rfc3339(),
                "max_capacity": 12,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let session = extract_json(created).await["data"].clone();
    assert_eq!(session["status"], "scheduled");
    assert_eq!(session["current_bookings"], 0);
    let id = session["id"].as_str().unwrap().to_string();

    let updated = app
        .clone()
        .oneshot(send_json(
            Method::PATCH,
            &format!("/api/sessions/{}", id),
            json!({ "max_capacity": 8 }),
        ))
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(extract_json(updated).await["data"]["max_capacity"], 8);

    let cancelled = app
        .clone()
        .oneshot(post(&format!("/api/sessions/{}/cancel", id)))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::OK);
    let body = extract_json(cancelled).await;
    assert_eq!(body["data"]["session"]["status"], "cancelled");
    assert_eq!(body["data"]["cancelled_bookings"], json!([]));

    let again = app
        .oneshot(send_json(
            Method::PATCH,
            &format!("/api/sessions/{}", id),
            json!({ "title": "Evening flow" }),
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(extract_json(again).await["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn cancel_then_attend_is_rejected() {
    let seeded = seeded(1).await;
    let app = app(seeded.store.clone());

    let booked = app
        .clone()
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();
    let booking_id = extract_json(booked).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let cancelled = app
        .clone()
        .oneshot(post(&format!("/api/bookings/{}/cancel", booking_id)))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::OK);
    assert_eq!(extract_json(cancelled).await["data"]["status"], "cancelled");

    let attend = app
        .oneshot(post(&format!("/api/bookings/{}/attend", booking_id)))
        .await
        .unwrap();
    assert_eq!(attend.status(), StatusCode::CONFLICT);
    assert_eq!(extract_json(attend).await["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn booking_notification_can_be_read() {
    let seeded = seeded(1).await;
    let app = app(seeded.store.clone());
    app.clone()
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();

    let uri = format!("/api/users/{}/notifications", seeded.member.profile_id);
    let listed = extract_json(app.clone().oneshot(get(&uri)).await.unwrap()).await;
    let notifications = listed["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "booking_confirmed");
    assert_eq!(notifications[0]["is_read"], false);
    let id = notifications[0]["id"].as_str().unwrap().to_string();

    let read = app
        .oneshot(post(&format!("/api/notifications/{}/read", id)))
        .await
        .unwrap();
    assert_eq!(read.status(), StatusCode::OK);
    let body = extract_json(read).await;
    assert_eq!(body["data"]["is_read"], true);
    assert!(body["data"]["read_at"].is_string());
}

#[tokio::test]
async fn package_request_round_trip() {
    let seeded = seeded(0).await;
    let app = app(seeded.store.clone());

    let created = app
        .clone()
        .oneshot(send_json(
            Method::POST,
            "/api/package-requests",
            json!({ "member_id": seeded.member.id, "package_id": seeded.package.id }),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = extract_json(created).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let pending = extract_json(
        app.clone()
            .oneshot(get("/api/package-requests?status=pending"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(pending["data"].as_array().unwrap().len(), 1);

    let approved = app
        .clone()
        .oneshot(post(&format!("/api/package-requests/{}/approve", id)))
        .await
        .unwrap();
    assert_eq!(approved.status(), StatusCode::OK);
    let body = extract_json(approved).await;
    assert_eq!(body["data"]["request"]["status"], "approved");
    assert_eq!(body["data"]["credit"]["sessions_remaining"], 1);

    let rejected = app
        .clone()
        .oneshot(post(&format!("/api/package-requests/{}/reject", id)))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::CONFLICT);

    // The new credit makes the member bookable.
    let booked = app
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();
    assert_eq!(booked.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn summary_reports_utilization() {
    let seeded = seeded(1).await;
    let app = app(seeded.store.clone());
    app.clone()
        .oneshot(send_json(Method::POST, "/api/bookings", booking_body(&seeded)))
        .await
        .unwrap();

    let body = extract_json(app.oneshot(get("/api/reports/summary")).await.unwrap()).await;

    assert_eq!(body["data"]["upcoming_sessions"], 1);
    assert_eq!(body["data"]["bookings"]["confirmed"], 1);
    assert_eq!(body["data"]["booked_seats"], 1);
    assert_eq!(body["data"]["utilization"], 1.0);
    assert_eq!(body["data"]["members_with_active_credits"], 0);
}
