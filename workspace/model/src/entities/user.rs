use sea_orm::entity::prelude::*;

/// Represents a member of the household using the tracker.
/// Authentication itself lives outside this service; transactions reference
/// users through `paid_by_user_id` for balance splitting.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // A user can own multiple budgets.
    #[sea_orm(has_many = "super::budget::Entity")]
    Budget,
}

impl ActiveModelBehavior for ActiveModel {}
