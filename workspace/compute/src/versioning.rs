use chrono::NaiveDate;
use model::entities::recurring_transaction_version::Model as Version;
use tracing::trace;

use crate::error::{ComputeError, Result};

/// The atomic write set for an effective-dated edit of a recurring rule.
///
/// The caller executes the plan inside a single database transaction:
/// either close-current-and-open-new, or replace-pending. Planning is pure so
/// the temporal rules stay testable without a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    /// The effective date is today or in the past: close the open current
    /// version at the effective date (if one exists), drop any scheduled
    /// pending version, and insert the new version as current. The rule's
    /// live fields must be refreshed to mirror the new version. After an
    /// immediate edit exactly one open version remains.
    Immediate {
        close_version_id: Option<i32>,
        remove_pending_id: Option<i32>,
    },
    /// The effective date is in the future: delete the previous pending
    /// version (if any) and insert the new one. The current version is left
    /// untouched.
    Scheduled { replace_version_id: Option<i32> },
}

/// Resolves the version that is effective on `as_of`.
///
/// A version applies when `effective_from <= as_of` and `effective_until` is
/// either open or after `as_of`. Should intervals transiently overlap, the
/// one with the latest `effective_from` wins so resolution never depends on
/// row order. An empty result indicates corrupted history and is an error.
pub fn resolve_current<'a>(versions: &'a [Version], as_of: NaiveDate) -> Result<&'a Version> {
    versions
        .iter()
        .filter(|v| v.effective_from <= as_of && v.effective_until.map_or(true, |until| until > as_of))
        .max_by_key(|v| v.effective_from)
        .ok_or_else(|| {
            ComputeError::NotFound(format!("no version effective on {as_of} in history"))
        })
}

/// Resolves the pending (future-effective, open-ended) version, if any.
///
/// The invariant allows at most one; picking the earliest `effective_from`
/// keeps the answer deterministic should the invariant ever be violated.
pub fn resolve_pending<'a>(versions: &'a [Version], as_of: NaiveDate) -> Option<&'a Version> {
    versions
        .iter()
        .filter(|v| v.effective_from > as_of && v.effective_until.is_none())
        .min_by_key(|v| v.effective_from)
}

/// Plans an edit with the given effective date against the current history.
pub fn plan_update(versions: &[Version], as_of: NaiveDate, effective_date: NaiveDate) -> UpdatePlan {
    if effective_date <= as_of {
        // Only the open current version gets closed; already-closed history
        // is never touched.
        let close_version_id = versions
            .iter()
            .find(|v| v.effective_until.is_none() && v.effective_from <= as_of)
            .map(|v| v.id);
        let remove_pending_id = resolve_pending(versions, as_of).map(|v| v.id);
        trace!(
            "Planning immediate update effective {}, closing version {:?}, dropping pending {:?}",
            effective_date, close_version_id, remove_pending_id
        );
        UpdatePlan::Immediate {
            close_version_id,
            remove_pending_id,
        }
    } else {
        let replace_version_id = resolve_pending(versions, as_of).map(|v| v.id);
        trace!(
            "Planning scheduled update effective {}, replacing pending {:?}",
            effective_date, replace_version_id
        );
        UpdatePlan::Scheduled { replace_version_id }
    }
}

/// Checks that a version may be cancelled.
///
/// Only a pending version (future-effective and open-ended) is cancellable;
/// the current version and anything already in effect stay immutable.
pub fn check_cancellable(version: &Version, as_of: NaiveDate) -> Result<()> {
    if version.effective_from <= as_of {
        return Err(ComputeError::InvalidState(
            "cannot cancel a version that is already current or past".to_string(),
        ));
    }
    if version.effective_until.is_some() {
        return Err(ComputeError::InvalidState(
            "cannot cancel a version that has already been superseded".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::recurring_transaction::Frequency;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn version(id: i32, from: NaiveDate, until: Option<NaiveDate>) -> Version {
        Version {
            id,
            recurring_transaction_id: 1,
            title: "Rent".to_string(),
            amount: Decimal::new(950, 0),
            category_id: 1,
            frequency: Frequency::Monthly,
            day: Some(1),
            effective_from: from,
            effective_until: until,
            created_at: from,
            change_reason: None,
        }
    }

    #[test]
    fn resolve_current_picks_open_version() {
        let versions = vec![
            version(1, d(2024, 1, 1), Some(d(2024, 3, 1))),
            version(2, d(2024, 3, 1), None),
        ];
        let current = resolve_current(&versions, d(2024, 6, 15)).unwrap();
        assert_eq!(current.id, 2);
    }

    #[test]
    fn resolve_current_honors_closed_interval() {
        let versions = vec![
            version(1, d(2024, 1, 1), Some(d(2024, 3, 1))),
            version(2, d(2024, 3, 1), None),
        ];
        // As of Feb 15 the first version is still in effect.
        let current = resolve_current(&versions, d(2024, 2, 15)).unwrap();
        assert_eq!(current.id, 1);
        // effective_until is exclusive: on Mar 1 version 2 takes over.
        let handover = resolve_current(&versions, d(2024, 3, 1)).unwrap();
        assert_eq!(handover.id, 2);
    }

    #[test]
    fn resolve_current_fails_on_empty_history() {
        let err = resolve_current(&[], d(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ComputeError::NotFound(_)));
    }

    #[test]
    fn resolve_current_ignores_pending_version() {
        let versions = vec![
            version(1, d(2024, 1, 1), None),
            version(2, d(2030, 1, 1), None),
        ];
        let current = resolve_current(&versions, d(2024, 6, 1)).unwrap();
        assert_eq!(current.id, 1);
    }

    #[test]
    fn resolve_pending_finds_future_open_version() {
        let versions = vec![
            version(1, d(2024, 1, 1), None),
            version(2, d(2030, 1, 1), None),
        ];
        assert_eq!(resolve_pending(&versions, d(2024, 6, 1)).unwrap().id, 2);
        // Once the effective date passes, the version is no longer pending.
        assert!(resolve_pending(&versions, d(2030, 1, 1)).is_none());
    }

    #[test]
    fn plan_update_today_closes_current() {
        let versions = vec![version(1, d(2024, 1, 1), None)];
        let plan = plan_update(&versions, d(2024, 6, 1), d(2024, 6, 1));
        assert_eq!(
            plan,
            UpdatePlan::Immediate {
                close_version_id: Some(1),
                remove_pending_id: None,
            }
        );
    }

    #[test]
    fn plan_update_today_also_drops_scheduled_pending() {
        let versions = vec![
            version(1, d(2024, 1, 1), None),
            version(2, d(2024, 9, 1), None),
        ];
        let plan = plan_update(&versions, d(2024, 6, 1), d(2024, 6, 1));
        assert_eq!(
            plan,
            UpdatePlan::Immediate {
                close_version_id: Some(1),
                remove_pending_id: Some(2),
            }
        );
    }

    #[test]
    fn plan_update_future_leaves_current_untouched() {
        let versions = vec![version(1, d(2024, 1, 1), None)];
        let plan = plan_update(&versions, d(2024, 6, 1), d(2024, 9, 1));
        assert_eq!(plan, UpdatePlan::Scheduled { replace_version_id: None });
    }

    #[test]
    fn plan_update_future_replaces_existing_pending() {
        let versions = vec![
            version(1, d(2024, 1, 1), None),
            version(2, d(2024, 9, 1), None),
        ];
        let plan = plan_update(&versions, d(2024, 6, 1), d(2024, 10, 1));
        assert_eq!(plan, UpdatePlan::Scheduled { replace_version_id: Some(2) });
    }

    #[test]
    fn cancel_pending_version_is_allowed() {
        let pending = version(2, d(2030, 1, 1), None);
        assert!(check_cancellable(&pending, d(2024, 6, 1)).is_ok());
    }

    #[test]
    fn cancel_current_version_is_invalid_state() {
        let current = version(1, d(2024, 1, 1), None);
        let err = check_cancellable(&current, d(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidState(_)));
    }

    #[test]
    fn cancel_superseded_version_is_invalid_state() {
        let closed = version(1, d(2030, 1, 1), Some(d(2031, 1, 1)));
        let err = check_cancellable(&closed, d(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidState(_)));
    }
}
