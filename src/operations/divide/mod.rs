//! Splitting a filled region along a cutting path.
//!
//! The cutter never encloses anything: it only adds edges to the region's
//! planar graph. Points where the cutter meets the region's own edges are
//! the true crossings; everything else about the region is left alone.

mod cut_path;
mod cut_positions;
mod division;
mod slice;

pub use cut_path::CutPath;
pub use cut_positions::cut_positions;
pub use division::{Divide, Division};
pub use slice::{Slice, SliceResult, SliceSide};
