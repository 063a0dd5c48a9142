use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::recurring_transaction::Frequency;
use super::recurring_transaction;

/// One effective-dated version of a recurring rule.
///
/// Versions form an append-only interval history over
/// `[effective_from, effective_until)`. Invariants per rule:
/// intervals never overlap; at most one version is open-ended
/// (`effective_until` null) with `effective_from` in the past (the current
/// version), and at most one is open-ended with `effective_from` in the
/// future (the pending version).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_transaction_versions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub recurring_transaction_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub category_id: i32,
    pub frequency: Frequency,
    pub day: Option<i32>,
    /// First day this version applies (inclusive).
    pub effective_from: NaiveDate,
    /// First day this version no longer applies (exclusive); null while the
    /// version is current or pending.
    pub effective_until: Option<NaiveDate>,
    pub created_at: NaiveDate,
    pub change_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "recurring_transaction::Entity",
        from = "Column::RecurringTransactionId",
        to = "recurring_transaction::Column::Id",
        on_delete = "Cascade"
    )]
    RecurringTransaction,
}

impl Related<recurring_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
