//! Transport-layer types shared between the compute core and the backend
//! handlers. The compute crate produces these structures and the backend
//! serializes them as-is, so response shapes are defined exactly once.

mod projection;

pub use projection::{CategoryProjection, DateRange, ProjectionTotals};
