//! 2D geometry primitives used by the matcher.
//!
//! Image coordinates throughout: origin top-left, x grows to the right and
//! y grows downwards.

mod fitting;
mod line;
mod point;
mod polygon;

pub use fitting::LineFitting;
pub use line::{Line, split_by_orientation};
pub use point::{Offset, Point};
pub use polygon::{BBox, Polygon};

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Orientation::Horizontal)
    }
}
