use axum::extract::State;
use axum::response::Response;
use chrono::Utc;

use crate::state::AppState;
use crate::utils::response::success;
use crate::utils::AppResult;

pub async fn summary(State(state): State<AppState>) -> AppResult<Response> {
    let report = state.store.summary(Utc::now()).await?;
    Ok(success(report, "Summary report"))
}
