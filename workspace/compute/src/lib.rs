//! Temporal core of the budget tracker.
//!
//! Everything in this crate is pure: version resolution and update planning
//! over the effective-dated history of a recurring rule, calendar occurrence
//! counting per frequency class, and projection aggregation. The backend
//! fetches rows, calls in here, and persists whatever plan comes back; this
//! keeps the non-trivial temporal logic testable without a database and
//! safely parallelizable across rules.

pub mod error;
pub mod occurrence;
pub mod projection;
pub mod versioning;

pub use error::{ComputeError, Result};
