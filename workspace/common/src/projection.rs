use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of days covered by the range. A single-day range has length 1.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Projected income/expense totals for a set of recurring rules over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectionTotals {
    /// Sum of amount x occurrence count over all active income rules.
    pub projected_income: Decimal,
    /// Sum of amount x occurrence count over all active expense rules.
    pub projected_expenses: Decimal,
    /// projected_income - projected_expenses.
    pub net_balance: Decimal,
}

impl ProjectionTotals {
    /// All-zero totals, the result for an empty rule set.
    pub fn zero() -> Self {
        Self {
            projected_income: Decimal::ZERO,
            projected_expenses: Decimal::ZERO,
            net_balance: Decimal::ZERO,
        }
    }

    /// Rounds every component to two decimal places for display.
    pub fn rounded(&self) -> Self {
        Self {
            projected_income: self.projected_income.round_dp(2),
            projected_expenses: self.projected_expenses.round_dp(2),
            net_balance: self.net_balance.round_dp(2),
        }
    }
}

impl Default for ProjectionTotals {
    fn default() -> Self {
        Self::zero()
    }
}

/// Per-category projected amounts, keyed by category id at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryProjection {
    /// Projected income attributed to the category.
    pub projected_income: Decimal,
    /// Projected expenses attributed to the category.
    pub projected_expenses: Decimal,
}

impl CategoryProjection {
    pub fn zero() -> Self {
        Self {
            projected_income: Decimal::ZERO,
            projected_expenses: Decimal::ZERO,
        }
    }
}

impl Default for CategoryProjection {
    fn default() -> Self {
        Self::zero()
    }
}
