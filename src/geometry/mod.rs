pub mod cut;
pub mod fill_rule;
pub mod path;
pub mod source;

pub use cut::CutPosition;
pub use fill_rule::FillRule;
pub use path::{Path, PathBuilder, Piece, PieceGeometry, Segment, SubPath};
pub use source::{PathSource, StyledPath};
