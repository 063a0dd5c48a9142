//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the budget tracking application here:
//! budgets with member users, categories with allocations, one-off
//! transactions, and recurring rules with their effective-dated versions.

pub mod budget;
pub mod budget_member;
pub mod category;
pub mod recurring_transaction;
pub mod recurring_transaction_version;
pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget::Entity as Budget;
    pub use super::budget_member::Entity as BudgetMember;
    pub use super::category::Entity as Category;
    pub use super::recurring_transaction::Entity as RecurringTransaction;
    pub use super::recurring_transaction_version::Entity as RecurringTransactionVersion;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}
