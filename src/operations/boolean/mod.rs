mod difference;
mod engine;
mod intersection;
mod select;
mod symmetric_difference;
mod uncross;
mod union;
mod union_all;

pub use difference::Difference;
pub use engine::{combine, Boolean};
pub use intersection::Intersection;
pub use select::{keep_decision, BoolOp};
pub use symmetric_difference::SymmetricDifference;
pub use uncross::Uncross;
pub use union::Union;
pub use union_all::UnionAll;

pub(crate) use engine::{boolean_execute, flatten_operand};
pub(crate) use uncross::region_boundary;
