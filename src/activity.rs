//! # Offer Activity Rule
//!
//! Decides whether an offer is currently effective. The same rule is exposed as
//! a pure predicate (for already-loaded offers) and as a SeaORM [`Condition`]
//! (for store queries), so the public listings, the public brand page and the
//! admin status badge all agree.
//!
//! An offer is effective at `now` iff `active && start <= now && (end is None || end >= now)`.
//! Both boundaries are inclusive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::offer;

/// Pure effectiveness predicate.
pub fn is_effective(
    active: bool,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    active && start <= now && end.is_none_or(|end| end >= now)
}

/// Store filter equivalent to [`is_effective`] evaluated at `now`.
pub fn effective_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(offer::Column::Active.eq(true))
        .add(offer::Column::StartDate.lte(now))
        .add(
            Condition::any()
                .add(offer::Column::EndDate.is_null())
                .add(offer::Column::EndDate.gte(now)),
        )
}

/// Lifecycle status of an offer at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    /// Effective right now
    Active,
    /// Switched on but not started yet
    Scheduled,
    /// Switched on but the end date has passed
    Expired,
    /// Switched off manually
    Inactive,
}

impl OfferStatus {
    /// Classify an offer. `Active` is returned exactly when [`is_effective`] holds.
    pub fn classify(
        active: bool,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if !active {
            OfferStatus::Inactive
        } else if start > now {
            OfferStatus::Scheduled
        } else if end.is_some_and(|end| end < now) {
            OfferStatus::Expired
        } else {
            OfferStatus::Active
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OfferStatus::Active => "Active",
            OfferStatus::Scheduled => "Scheduled",
            OfferStatus::Expired => "Expired",
            OfferStatus::Inactive => "Inactive",
        }
    }
}

/// How the admin offer list derives its status badge.
///
/// `DateWindow` applies the shared rule. `ActiveFlagOnly` keeps the legacy admin
/// behaviour where any offer with `active == true` is shown as active regardless
/// of its date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminStatusPolicy {
    #[default]
    DateWindow,
    #[serde(rename = "active-flag")]
    ActiveFlagOnly,
}

impl AdminStatusPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminStatusPolicy::DateWindow => "date-window",
            AdminStatusPolicy::ActiveFlagOnly => "active-flag",
        }
    }
}

impl fmt::Display for AdminStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatusPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "date-window" => Ok(AdminStatusPolicy::DateWindow),
            "active-flag" => Ok(AdminStatusPolicy::ActiveFlagOnly),
            other => Err(format!(
                "unknown admin status policy '{other}' (expected date-window or active-flag)"
            )),
        }
    }
}

/// Status badge shown for an offer in the admin views.
pub fn admin_badge(
    offer: &offer::Model,
    now: DateTime<Utc>,
    policy: AdminStatusPolicy,
) -> OfferStatus {
    match policy {
        AdminStatusPolicy::DateWindow => offer.status_at(now),
        AdminStatusPolicy::ActiveFlagOnly if offer.active => OfferStatus::Active,
        AdminStatusPolicy::ActiveFlagOnly => OfferStatus::Inactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn offer(active: bool, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> offer::Model {
        offer::Model {
            id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            title: "Spring sale".to_string(),
            description: "Everything twenty percent off".to_string(),
            start_date: start.fixed_offset(),
            end_date: end.map(|end| end.fixed_offset()),
            coupon_code: None,
            discount_percent: Some(20),
            active,
            created_at: start.fixed_offset(),
            updated_at: start.fixed_offset(),
        }
    }

    #[test]
    fn open_ended_started_offer_is_effective() {
        let now = now();
        assert!(is_effective(true, now - Duration::days(1), None, now));
    }

    #[test]
    fn inactive_flag_always_wins() {
        let now = now();
        assert!(!is_effective(false, now - Duration::days(1), None, now));
        assert!(!is_effective(
            false,
            now - Duration::days(1),
            Some(now + Duration::days(1)),
            now
        ));
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let now = now();
        assert!(is_effective(true, now, Some(now), now));
        assert!(!is_effective(true, now + Duration::seconds(1), None, now));
        assert!(!is_effective(
            true,
            now - Duration::days(2),
            Some(now - Duration::seconds(1)),
            now
        ));
    }

    #[test]
    fn predicate_matches_definition_over_a_grid() {
        let now = now();
        let instants = [
            None,
            Some(now - Duration::days(3)),
            Some(now - Duration::seconds(1)),
            Some(now),
            Some(now + Duration::seconds(1)),
            Some(now + Duration::days(3)),
        ];

        for active in [true, false] {
            for start in instants.iter().flatten() {
                for end in instants {
                    let expected =
                        active && *start <= now && (end.is_none() || end.unwrap() >= now);
                    assert_eq!(is_effective(active, *start, end, now), expected);
                    assert_eq!(
                        OfferStatus::classify(active, *start, end, now) == OfferStatus::Active,
                        expected
                    );
                }
            }
        }
    }

    #[test]
    fn classify_distinguishes_scheduled_and_expired() {
        let now = now();
        assert_eq!(
            OfferStatus::classify(true, now + Duration::days(1), None, now),
            OfferStatus::Scheduled
        );
        assert_eq!(
            OfferStatus::classify(
                true,
                now - Duration::days(10),
                Some(now - Duration::days(1)),
                now
            ),
            OfferStatus::Expired
        );
        assert_eq!(
            OfferStatus::classify(false, now + Duration::days(1), None, now),
            OfferStatus::Inactive
        );
    }

    #[test]
    fn admin_badge_policies_disagree_on_expired_offers() {
        let now = now();
        let expired = offer(
            true,
            now - Duration::days(10),
            Some(now - Duration::days(1)),
        );

        assert_eq!(
            admin_badge(&expired, now, AdminStatusPolicy::DateWindow),
            OfferStatus::Expired
        );
        assert_eq!(
            admin_badge(&expired, now, AdminStatusPolicy::ActiveFlagOnly),
            OfferStatus::Active
        );

        let switched_off = offer(false, now - Duration::days(1), None);
        assert_eq!(
            admin_badge(&switched_off, now, AdminStatusPolicy::ActiveFlagOnly),
            OfferStatus::Inactive
        );
    }

    #[test]
    fn model_helpers_use_the_shared_rule() {
        let now = now();
        let current = offer(true, now - Duration::days(1), None);
        let yesterday = offer(true, now - Duration::days(5), Some(now - Duration::days(1)));

        assert!(current.is_effective_at(now));
        assert!(!yesterday.is_effective_at(now));
        assert_eq!(yesterday.status_at(now), OfferStatus::Expired);
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!(
            "date-window".parse::<AdminStatusPolicy>().unwrap(),
            AdminStatusPolicy::DateWindow
        );
        assert_eq!(
            " Active-Flag ".parse::<AdminStatusPolicy>().unwrap(),
            AdminStatusPolicy::ActiveFlagOnly
        );
        assert!("dates".parse::<AdminStatusPolicy>().is_err());
    }
}
