use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub package_type: String,
    pub sessions_total: i32,
    pub price: Decimal,
    pub validity_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Package {
    /// Last valid day of a credit bought from this package on `purchased`.
    pub fn expiry_from(&self, purchased: NaiveDate) -> Option<NaiveDate> {
        self.validity_days
            .and_then(|days| purchased.checked_add_days(chrono::Days::new(days as u64)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credit_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    Active,
    Expired,
}

/// A member's purchased package, always read joined with its package
/// definition so callers never deal with partially loaded shapes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackageCredit {
    pub id: Uuid,
    pub member_id: Uuid,
    pub package_id: Uuid,
    pub package_name: String,
    pub package_type: String,
    pub sessions_total: i32,
    pub sessions_remaining: i32,
    pub status: CreditStatus,
    pub purchased_at: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
}

impl PackageCredit {
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    pub fn is_usable_on(&self, today: NaiveDate) -> bool {
        self.status == CreditStatus::Active
            && self.sessions_remaining > 0
            && !self.is_expired_on(today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(remaining: i32, expiry: Option<NaiveDate>) -> PackageCredit {
        PackageCredit {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            package_id: Uuid::new_v4(),
            package_name: "10 x PT".into(),
            package_type: "Personal Training".into(),
            sessions_total: 10,
            sessions_remaining: remaining,
            status: CreditStatus::Active,
            purchased_at: Utc::now(),
            expiry_date: expiry,
        }
    }

    #[test]
    fn expiry_date_is_inclusive() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let c = credit(3, Some(day));
        assert!(c.is_usable_on(day));
        assert!(!c.is_usable_on(day.succ_opt().unwrap()));
    }

    #[test]
    fn exhausted_credit_is_not_usable() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(!credit(0, None).is_usable_on(today));
    }

    #[test]
    fn expiry_from_adds_validity_days() {
        let package = Package {
            id: Uuid::new_v4(),
            name: "Monthly".into(),
            package_type: "Group Class".into(),
            sessions_total: 8,
            price: Decimal::new(4999, 2),
            validity_days: Some(30),
            created_at: Utc::now(),
        };
        let bought = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(
            package.expiry_from(bought),
            NaiveDate::from_ymd_opt(2025, 2, 9)
        );
    }
}
