//! Package requests: how members obtain new credits.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewPackageRequest, PackageCredit, PackageRequest};
use crate::store::GymStore;
use crate::utils::{AppError, AppResult};

pub async fn request_package(
    store: &dyn GymStore,
    request: &NewPackageRequest,
    now: DateTime<Utc>,
) -> AppResult<PackageRequest> {
    store
        .find_member(request.member_id)
        .await?
        .ok_or_else(|| AppError::not_found("Member", request.member_id))?;
    store
        .find_package(request.package_id)
        .await?
        .ok_or_else(|| AppError::not_found("Package", request.package_id))?;

    let created = store
        .insert_package_request(request.member_id, request.package_id, now)
        .await?;
    tracing::info!(
        request_id = %created.id,
        member_id = %created.member_id,
        package_id = %created.package_id,
        "Package requested"
    );
    Ok(created)
}

pub async fn approve(
    store: &dyn GymStore,
    request_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<(PackageRequest, PackageCredit)> {
    let (request, credit) = store.approve_package_request(request_id, now).await?;
    tracing::info!(
        request_id = %request.id,
        credit_id = %credit.id,
        sessions = credit.sessions_remaining,
        "Package request approved"
    );
    Ok((request, credit))
}

pub async fn reject(
    store: &dyn GymStore,
    request_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<PackageRequest> {
    let request = store.reject_package_request(request_id, now).await?;
    tracing::info!(request_id = %request.id, "Package request rejected");
    Ok(request)
}
