use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackageRequest {
    pub id: Uuid,
    pub member_id: Uuid,
    pub package_id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl PackageRequest {
    pub fn ensure_pending(&self) -> AppResult<()> {
        if self.status == RequestStatus::Pending {
            Ok(())
        } else {
            Err(AppError::InvalidState(format!(
                "package request {} was already {:?}",
                self.id, self.status
            )))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPackageRequest {
    pub member_id: Uuid,
    pub package_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageRequestFilter {
    pub status: Option<RequestStatus>,
}
