use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::transaction::TransactionType;
use super::{budget, category};

/// How often a recurring rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Frequency {
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// A recurring transaction rule.
///
/// The row's mutable fields (title/amount/category/frequency/day) always
/// mirror the currently effective version in `recurring_transaction_versions`;
/// edits append versions rather than overwrite history. `created_at` is fixed
/// at creation and anchors the month of yearly occurrences for the whole life
/// of the rule, even across frequency edits.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub category_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub frequency: Frequency,
    /// Day-of-month (1-31) for monthly/yearly, day-of-week (0-6, Monday = 0)
    /// for weekly. Clamped to valid bounds when occurrences are generated.
    pub day: Option<i32>,
    /// Suspends occurrence generation without touching the version history.
    #[sea_orm(default_value = "true")]
    pub active: bool,
    pub created_at: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "budget::Entity",
        from = "Column::BudgetId",
        to = "budget::Column::Id",
        on_delete = "Cascade"
    )]
    Budget,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "Cascade"
    )]
    Category,
    #[sea_orm(has_many = "super::recurring_transaction_version::Entity")]
    Version,
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::recurring_transaction_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Version.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
