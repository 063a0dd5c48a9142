use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{budget, user};

/// Membership of a user in a shared budget, with the percentage share used
/// when splitting balances between members.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub budget_id: i32,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    /// Share of common expenses carried by this member, in percent.
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub share: Decimal,
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
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
