use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::package::PackageCredit;

/// A `members` row joined with its profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberCredits {
    #[serde(flatten)]
    pub member: Member,
    pub credits: Vec<PackageCredit>,
}
