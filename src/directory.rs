//! Read side of booking: which members can book, and what.
//!
//! Every read first runs the session sweep, so elapsed sessions are
//! completed before anyone sees them. Backend failures degrade to an
//! empty result instead of an error; lookups of unknown ids still fail.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{MemberCredits, PackageCredit, Session};
use crate::store::{GymStore, SweepOutcome};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct BookingOptions {
    pub member_id: Uuid,
    pub credits: Vec<PackageCredit>,
    pub sessions: Vec<Session>,
}

pub async fn sweep(store: &dyn GymStore, now: DateTime<Utc>) -> SweepOutcome {
    match store.sweep(now).await {
        Ok(outcome) => {
            if outcome != SweepOutcome::default() {
                tracing::info!(
                    sessions_completed = outcome.sessions_completed,
                    credits_expired = outcome.credits_expired,
                    "Sweep applied"
                );
            }
            outcome
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sweep failed");
            SweepOutcome::default()
        }
    }
}

impl BookingOptions {
    /// No credits and no sessions for `member_id`.
    pub fn empty(member_id: Uuid) -> Self {
        Self {
            member_id,
            credits: Vec::new(),
            sessions: Vec::new(),
        }
    }
}

/// Replaces backend failures with an empty value.
pub fn or_empty<T: Default>(result: AppResult<T>) -> AppResult<T> {
    or_empty_with(result, T::default)
}

/// Like [`or_empty`], for results whose empty form carries context.
pub fn or_empty_with<T>(result: AppResult<T>, empty: impl FnOnce() -> T) -> AppResult<T> {
    match result {
        Err(AppError::DatabaseError(e)) => {
            tracing::warn!(error = ?e, "Directory read failed, returning no data");
            Ok(empty())
        }
        other => other,
    }
}

pub async fn member_booking_options(
    store: &dyn GymStore,
    member_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<BookingOptions> {
    sweep(store, now).await;

    let member = store
        .find_member(member_id)
        .await?
        .ok_or_else(|| AppError::not_found("Member", member_id))?;
    let credits = store.active_credits(Some(member.id), now.date_naive()).await?;

    let package_types: Vec<String> = credits
        .iter()
        .map(|c| c.package_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let sessions = if package_types.is_empty() {
        Vec::new()
    } else {
        store.upcoming_sessions(now, Some(package_types.as_slice())).await?
    };

    Ok(BookingOptions {
        member_id: member.id,
        credits,
        sessions,
    })
}

pub async fn members_with_active_credits(
    store: &dyn GymStore,
    now: DateTime<Utc>,
) -> AppResult<Vec<MemberCredits>> {
    sweep(store, now).await;

    let mut by_member: BTreeMap<Uuid, Vec<PackageCredit>> = BTreeMap::new();
    for credit in store.active_credits(None, now.date_naive()).await? {
        by_member.entry(credit.member_id).or_default().push(credit);
    }
    if by_member.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = by_member.keys().copied().collect();
    let members = store.members_by_ids(&ids).await?;
    Ok(members
        .into_iter()
        .filter_map(|member| {
            let credits = by_member.remove(&member.id)?;
            Some(MemberCredits { member, credits })
        })
        .collect())
}

pub async fn upcoming_sessions(
    store: &dyn GymStore,
    now: DateTime<Utc>,
) -> AppResult<Vec<Session>> {
    sweep(store, now).await;
    store.upcoming_sessions(now, None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_booking_options_keep_the_member() {
        let member_id = Uuid::new_v4();
        let options = or_empty_with(
            Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut)),
            || BookingOptions::empty(member_id),
        )
        .unwrap();
        assert_eq!(options.member_id, member_id);
        assert!(options.credits.is_empty() && options.sessions.is_empty());
    }

    #[test]
    fn lookups_of_unknown_ids_still_fail() {
        let missing = AppError::not_found("Member", Uuid::nil());
        let result: AppResult<Vec<Session>> = or_empty(Err(missing));
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let failed = AppError::DatabaseError(sqlx::Error::RowNotFound);
        let result: AppResult<Vec<Session>> = or_empty(Err(failed));
        assert!(result.unwrap().is_empty());
    }
}
