use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{NewPackageRequest, PackageCredit, PackageRequest, PackageRequestFilter};
use crate::packages;
use crate::state::AppState;
use crate::utils::response::{created, success};
use crate::utils::AppResult;

#[derive(Serialize)]
struct ApprovedRequest {
    request: PackageRequest,
    credit: PackageCredit,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<PackageRequestFilter>,
) -> AppResult<Response> {
    let requests = state.store.package_requests(filter.status).await?;
    Ok(success(requests, "Package requests"))
}

pub async fn create_request(
    State(state): State<AppState>,
    Json(request): Json<NewPackageRequest>,
) -> AppResult<Response> {
    let created_request =
        packages::request_package(state.store.as_ref(), &request, Utc::now()).await?;
    Ok(created(created_request, "Package requested"))
}

pub async fn approve_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Response> {
    let (request, credit) = packages::approve(state.store.as_ref(), request_id, Utc::now()).await?;
    Ok(success(ApprovedRequest { request, credit }, "Package request approved"))
}

pub async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Response> {
    let request = packages::reject(state.store.as_ref(), request_id, Utc::now()).await?;
    Ok(success(request, "Package request rejected"))
}
