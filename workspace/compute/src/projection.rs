use std::collections::HashMap;

use chrono::NaiveDate;
use common::{CategoryProjection, ProjectionTotals};
use model::entities::recurring_transaction::Model as RecurringRule;
use model::entities::transaction::TransactionType;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::occurrence::count_occurrences;

/// Projects income/expense totals for the given rules over `[start, end]`.
///
/// Each active rule contributes amount x occurrence count; inactive rules
/// contribute nothing. An empty rule set yields all-zero totals.
pub fn project_totals(
    rules: &[RecurringRule],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ProjectionTotals> {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;

    for rule in rules {
        let count = count_occurrences(rule, start, end)?;
        if count == 0 {
            continue;
        }
        let projected = rule.amount * Decimal::from(count);
        match rule.transaction_type {
            TransactionType::Income => income += projected,
            TransactionType::Expense => expenses += projected,
        }
    }

    debug!(
        "Projected {} rules over [{}, {}]: income={}, expenses={}",
        rules.len(),
        start,
        end,
        income,
        expenses
    );

    Ok(ProjectionTotals {
        projected_income: income,
        projected_expenses: expenses,
        net_balance: income - expenses,
    })
}

/// Projects amounts per category, keyed by category id.
///
/// Feeds the per-category "projected remaining" view: the caller subtracts
/// these from the allocated amount together with actual spend.
pub fn project_by_category(
    rules: &[RecurringRule],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<i32, CategoryProjection>> {
    let mut by_category: HashMap<i32, CategoryProjection> = HashMap::new();

    for rule in rules {
        let count = count_occurrences(rule, start, end)?;
        if count == 0 {
            continue;
        }
        let projected = rule.amount * Decimal::from(count);
        let entry = by_category.entry(rule.category_id).or_default();
        match rule.transaction_type {
            TransactionType::Income => entry.projected_income += projected,
            TransactionType::Expense => entry.projected_expenses += projected,
        }
    }

    Ok(by_category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeError;
    use model::entities::recurring_transaction::Frequency;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rule(
        id: i32,
        category_id: i32,
        amount: i64,
        transaction_type: TransactionType,
        frequency: Frequency,
        day: Option<i32>,
    ) -> RecurringRule {
        RecurringRule {
            id,
            budget_id: 1,
            category_id,
            title: format!("rule-{id}"),
            amount: Decimal::new(amount, 0),
            transaction_type,
            frequency,
            day,
            active: true,
            created_at: d(2024, 1, 1),
        }
    }

    #[test]
    fn empty_rule_set_projects_to_zero() {
        let totals = project_totals(&[], d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(totals, ProjectionTotals::zero());
    }

    #[test]
    fn monthly_day_31_over_leap_february_projects_one_occurrence() {
        let rules = vec![rule(1, 1, 100, TransactionType::Expense, Frequency::Monthly, Some(31))];
        let totals = project_totals(&rules, d(2024, 2, 1), d(2024, 2, 29)).unwrap();
        assert_eq!(totals.projected_expenses, Decimal::new(100, 0));
        assert_eq!(totals.projected_income, Decimal::ZERO);
        assert_eq!(totals.net_balance, Decimal::new(-100, 0));
    }

    #[test]
    fn weekly_rule_over_four_tuesdays_projects_eighty() {
        // 2024-03-05 through 2024-04-01 holds exactly four Tuesdays.
        let rules = vec![rule(1, 1, 20, TransactionType::Expense, Frequency::Weekly, Some(1))];
        let totals = project_totals(&rules, d(2024, 3, 5), d(2024, 4, 1)).unwrap();
        assert_eq!(totals.projected_expenses, Decimal::new(80, 0));
    }

    #[test]
    fn income_and_expenses_net_out() {
        let rules = vec![
            rule(1, 1, 2500, TransactionType::Income, Frequency::Monthly, Some(1)),
            rule(2, 2, 950, TransactionType::Expense, Frequency::Monthly, Some(1)),
            rule(3, 3, 60, TransactionType::Expense, Frequency::Monthly, Some(15)),
        ];
        let totals = project_totals(&rules, d(2024, 5, 1), d(2024, 6, 30)).unwrap();
        assert_eq!(totals.projected_income, Decimal::new(5000, 0));
        assert_eq!(totals.projected_expenses, Decimal::new(2020, 0));
        assert_eq!(totals.net_balance, Decimal::new(2980, 0));
    }

    #[test]
    fn inactive_rules_are_excluded() {
        let mut inactive = rule(1, 1, 100, TransactionType::Expense, Frequency::Monthly, Some(1));
        inactive.active = false;
        let totals = project_totals(&[inactive], d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(totals, ProjectionTotals::zero());
    }

    #[test]
    fn invalid_range_propagates() {
        let rules = vec![rule(1, 1, 100, TransactionType::Expense, Frequency::Monthly, Some(1))];
        let err = project_totals(&rules, d(2024, 2, 1), d(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidRange { .. }));
    }

    #[test]
    fn category_projection_groups_by_category() {
        let rules = vec![
            rule(1, 10, 950, TransactionType::Expense, Frequency::Monthly, Some(1)),
            rule(2, 10, 45, TransactionType::Expense, Frequency::Monthly, Some(5)),
            rule(3, 20, 2500, TransactionType::Income, Frequency::Monthly, Some(28)),
        ];
        let by_category = project_by_category(&rules, d(2024, 7, 1), d(2024, 7, 31)).unwrap();
        assert_eq!(by_category[&10].projected_expenses, Decimal::new(995, 0));
        assert_eq!(by_category[&20].projected_income, Decimal::new(2500, 0));
        assert!(!by_category.contains_key(&30));
    }
}
