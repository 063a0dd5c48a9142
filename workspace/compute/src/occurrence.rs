use chrono::{Datelike, Duration, NaiveDate};
use model::entities::recurring_transaction::{Frequency, Model as RecurringRule};
use tracing::trace;

use crate::error::{ComputeError, Result};

/// Returns the number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_year = year + (month / 12) as i32;
    let next_month = (month % 12) + 1;

    // First day of the next month, minus one day.
    let first_day_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1).unwrap();
    first_day_next_month.pred_opt().unwrap().day()
}

/// Generates the occurrence dates of a recurring rule within the inclusive
/// range `[start, end]`.
///
/// An inactive rule yields no occurrences. Day values that do not exist in a
/// given month (e.g. day 31 in February) are clamped to the last day of that
/// month rather than skipped. Yearly rules fire in the month the rule was
/// created; that anchor is fixed for the rule's lifetime even when later
/// versions change the frequency or day.
pub fn occurrence_dates(
    rule: &RecurringRule,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>> {
    if start > end {
        return Err(ComputeError::InvalidRange { start, end });
    }
    if !rule.active {
        trace!("Rule id={} is inactive, no occurrences", rule.id);
        return Ok(Vec::new());
    }

    let mut dates = Vec::new();

    match rule.frequency {
        Frequency::Monthly => {
            // Walk every calendar month overlapping the range and clamp the
            // target day to the month's length.
            let target_day = rule.day.unwrap_or(1).max(1) as u32;
            let (mut year, mut month) = (start.year(), start.month());
            loop {
                let day = target_day.min(days_in_month(year, month));
                let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
                if date >= start && date <= end {
                    dates.push(date);
                }
                if year == end.year() && month == end.month() {
                    break;
                }
                if month == 12 {
                    year += 1;
                    month = 1;
                } else {
                    month += 1;
                }
            }
        }
        Frequency::Weekly => {
            // Day-of-week convention: 0 = Monday .. 6 = Sunday. Out-of-range
            // values wrap instead of erroring.
            let target = rule.day.unwrap_or(1).rem_euclid(7) as u32;
            let offset = (target + 7 - start.weekday().num_days_from_monday()) % 7;
            let mut current = start + Duration::days(offset as i64);
            while current <= end {
                dates.push(current);
                current += Duration::days(7);
            }
        }
        Frequency::Yearly => {
            // The anchor month comes from the rule's creation date.
            let anchor_month = rule.created_at.month();
            let target_day = rule.day.unwrap_or(1).max(1) as u32;
            for year in start.year()..=end.year() {
                let day = target_day.min(days_in_month(year, anchor_month));
                let date = NaiveDate::from_ymd_opt(year, anchor_month, day).unwrap();
                if date >= start && date <= end {
                    dates.push(date);
                }
            }
        }
    }

    trace!(
        "Rule id={} has {} occurrences in [{}, {}]",
        rule.id,
        dates.len(),
        start,
        end
    );
    Ok(dates)
}

/// Counts the occurrences of a recurring rule within `[start, end]`.
pub fn count_occurrences(rule: &RecurringRule, start: NaiveDate, end: NaiveDate) -> Result<u32> {
    occurrence_dates(rule, start, end).map(|dates| dates.len() as u32)
}
