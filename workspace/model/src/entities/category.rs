use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::budget;

/// A spending envelope with a monthly allocated amount.
/// Categories are hierarchical (e.g. "Food" -> "Groceries"); a parent's
/// effective allocation is its own amount plus the sum of its children.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub name: String,
    /// Allocated amount for this category alone, excluding children.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    /// Self-referencing foreign key for subcategories.
    pub parent_id: Option<i32>,
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
    /// Self-referencing relationship for the parent category.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
