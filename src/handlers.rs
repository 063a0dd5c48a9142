pub mod budgets;
pub mod categories;
pub mod health;
pub mod projection;
pub mod recurring;
pub mod transactions;
pub mod users;
