use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppResult;

pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Response> {
    let notifications = state.store.notifications_for(user_id).await?;
    Ok(success(notifications, "Notifications"))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Response> {
    let notification = state
        .store
        .mark_notification_read(notification_id, Utc::now())
        .await?;
    Ok(success(notification, "Notification marked as read"))
}
