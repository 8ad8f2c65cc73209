pub mod error;
pub mod flatten;
pub mod geometry;
pub mod graph;
pub mod math;
pub mod operations;

pub use error::{PlanisError, Result};
