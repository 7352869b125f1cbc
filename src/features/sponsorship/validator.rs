use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    features::listings::models::Listing, utilities::timestamp::parse_flexible_timestamp,
};

/// Whether `listing` may be shown as sponsored at `now`.
///
/// The expiry is mandatory and exclusive: a listing whose `sponsoredUntil`
/// equals `now` is no longer sponsored. A start time that parses and lies
/// in the future hides the listing; one that does not parse is ignored.
pub fn is_active_sponsorship(listing: &Listing, now: DateTime<Utc>) -> bool {
    let Some(raw_until) = listing.sponsored_until.as_ref() else {
        return false;
    };

    let Some(until) = parse_flexible_timestamp(raw_until) else {
        warn!(
            "Listing {} has an unparseable sponsoredUntil {}, excluding it",
            listing.id, raw_until
        );
        return false;
    };

    if until <= now {
        return false;
    }

    if let Some(at) = listing
        .sponsored_at
        .as_ref()
        .and_then(parse_flexible_timestamp)
        && at > now
    {
        return false;
    }

    true
}

/// Re-derives the premium set from a fresh snapshot. Callers run this on
/// every push instead of caching the result.
pub fn active_sponsorships(snapshot: &[Listing], now: DateTime<Utc>) -> Vec<Listing> {
    snapshot
        .iter()
        .filter(|listing| is_active_sponsorship(listing, now))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::listings::models::ListingStatus, utilities::timestamp::timestamp_value,
    };
    use chrono::{Duration, TimeZone};
    use serde_json::{Value, json};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap()
    }

    fn sponsored(at: Option<Value>, until: Option<Value>) -> Listing {
        Listing {
            status: ListingStatus::Verified,
            is_sponsored: true,
            sponsored_at: at,
            sponsored_until: until,
            ..Default::default()
        }
    }

    #[test]
    fn missing_expiry_is_not_sponsored() {
        assert!(!is_active_sponsorship(&sponsored(None, None), now()));
    }

    #[test]
    fn expiry_is_exclusive() {
        let at_now = sponsored(None, Some(timestamp_value(now())));
        let past = sponsored(None, Some(timestamp_value(now() - Duration::days(1))));
        assert!(!is_active_sponsorship(&at_now, now()));
        assert!(!is_active_sponsorship(&past, now()));
    }

    #[test]
    fn future_start_is_not_sponsored_yet() {
        let listing = sponsored(
            Some(timestamp_value(now() + Duration::hours(1))),
            Some(timestamp_value(now() + Duration::days(7))),
        );
        assert!(!is_active_sponsorship(&listing, now()));
    }

    #[test]
    fn open_window_is_sponsored() {
        let started = sponsored(
            Some(json!("2025-05-01")),
            Some(json!((now() + Duration::days(3)).timestamp_millis())),
        );
        let no_start = sponsored(None, Some(json!("2025-06-01T00:00:00Z")));
        assert!(is_active_sponsorship(&started, now()));
        assert!(is_active_sponsorship(&no_start, now()));
    }

    #[test]
    fn unparseable_expiry_is_excluded() {
        let listing = sponsored(None, Some(json!("until further notice")));
        assert!(!is_active_sponsorship(&listing, now()));
    }

    #[test]
    fn unparseable_start_is_ignored() {
        let listing = sponsored(
            Some(json!("soon")),
            Some(timestamp_value(now() + Duration::days(1))),
        );
        assert!(is_active_sponsorship(&listing, now()));
    }

    #[test]
    fn filter_keeps_only_active_entries() {
        let live = sponsored(None, Some(timestamp_value(now() + Duration::days(1))));
        let expired = sponsored(None, Some(timestamp_value(now() - Duration::days(1))));
        let broken = sponsored(None, Some(json!({"nope": true})));

        let active = active_sponsorships(&[live.clone(), expired, broken], now());
        assert_eq!(active, vec![live]);
    }
}
