use crate::models::{PackageCredit, Session};

/// Picks the credit that pays for `session`: the first one, in input
/// order, of the session's package type with sessions left.
pub fn match_credit<'a>(
    credits: &'a [PackageCredit],
    session: &Session,
) -> Option<&'a PackageCredit> {
    credits.iter().find(|credit| {
        credit.package_type == session.package_type && credit.sessions_remaining > 0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreditStatus, SessionStatus};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn credit(package_type: &str, remaining: i32) -> PackageCredit {
        PackageCredit {
            id: Uuid::new_v4(),
            member_id: Uuid::nil(),
            package_id: Uuid::new_v4(),
            package_name: format!("{} bundle", package_type),
            package_type: package_type.to_string(),
            sessions_total: 10,
            sessions_remaining: remaining,
            status: CreditStatus::Active,
            purchased_at: Utc::now(),
            expiry_date: None,
        }
    }

    fn session(package_type: &str) -> Session {
        let start = Utc::now() + Duration::days(1);
        Session {
            id: Uuid::new_v4(),
            title: "Session".into(),
            package_type: package_type.to_string(),
            trainer_id: None,
            start_time: start,
            end_time: start + Duration::hours(1),
            max_capacity: 1,
            current_bookings: 0,
            status: SessionStatus::Scheduled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_match_when_type_differs() {
        let credits = vec![credit("Group Class", 5), credit("Yoga", 3)];
        assert!(match_credit(&credits, &session("Personal Training")).is_none());
    }

    #[test]
    fn first_eligible_credit_wins() {
        let credits = vec![
            credit("Yoga", 4),
            credit("Personal Training", 0),
            credit("Personal Training", 2),
            credit("Personal Training", 7),
        ];
        let matched = match_credit(&credits, &session("Personal Training")).unwrap();
        assert_eq!(matched.id, credits[2].id);
    }

    #[test]
    fn exhausted_credit_never_matches() {
        let credits = vec![credit("Personal Training", 0)];
        assert!(match_credit(&credits, &session("Personal Training")).is_none());
    }

    #[test]
    fn empty_credit_list() {
        assert!(match_credit(&[], &session("Yoga")).is_none());
    }
}
