//! Stroke outlining and region offsetting.

mod outline;
mod path_offset;
mod stroke_style;

pub use outline::Outline;
pub use path_offset::Offset;
pub use stroke_style::{LineCap, LineJoin, StrokeStyle};
