//! tablematch - template-driven table structure reconstruction.
//!
//! Given an annotated table template and the line segments detected in a
//! scanned page, the engine selects one globally consistent set of line
//! matches per orientation (maximum clique over an association graph) and
//! rebuilds every cell polygon from it.

pub mod error;
pub mod geometry;
pub mod matcher;
pub mod table;

pub use error::{MatchError, Result};
pub use geometry::{BBox, Line, LineFitting, Offset, Orientation, Point, Polygon};
pub use matcher::{TemplateMatcher, match_template};
pub use table::{
    BorderPosition, BorderSource, MatchConfig, MatchStats, TableCell, TableRegion, TableTemplate,
    TemplateCell,
};
