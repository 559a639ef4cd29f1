//! Reconstructed table output.

use std::fmt;

use itertools::Itertools;

use crate::geometry::{Line, Point, Polygon};

use super::types::BorderPosition;

/// Where the final line of a cell border came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BorderSource {
    /// Matched by the cell's own clique node.
    Detected,
    /// Copied from the adjacent cell sharing the border.
    Inherited,
    /// Taken from a cell on the same gridline.
    Neighbor,
    /// Opposite border shifted by the template cell extent.
    Mirrored,
    /// Template border shifted by the alignment offset.
    Template,
}

impl BorderSource {
    /// Whether the border is backed by detected lines.
    pub fn is_detected(self) -> bool {
        matches!(self, BorderSource::Detected | BorderSource::Inherited)
    }

    pub fn is_synthesized(self) -> bool {
        !self.is_detected()
    }
}

impl fmt::Display for BorderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BorderSource::Detected => "detected",
            BorderSource::Inherited => "inherited",
            BorderSource::Neighbor => "neighbor",
            BorderSource::Mirrored => "mirrored",
            BorderSource::Template => "template",
        };
        f.write_str(s)
    }
}

/// A cell of the reconstructed table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableCell {
    pub id: String,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub header: bool,
    /// Corner polygon (UL, BL, BR, UR), always four points. A corner whose
    /// borders are parallel holds the translated template corner and has no
    /// entry in `corner_pts`.
    pub polygon: Polygon,
    /// Corner indices into [`TableRegion::corners`], `None` where the
    /// border intersection does not exist.
    pub corner_pts: [Option<usize>; 4],
    /// Final border lines in left, right, top, bottom order.
    pub borders: [Line; 4],
    pub sources: [BorderSource; 4],
}

impl TableCell {
    pub fn border(&self, position: BorderPosition) -> Line {
        self.borders[position.index()]
    }

    pub fn source(&self, position: BorderPosition) -> BorderSource {
        self.sources[position.index()]
    }

    /// Corner `slot` (UL, BL, BR, UR) as the intersection of its two borders.
    pub fn corner(&self, slot: usize) -> Option<Point> {
        let [left, right, top, bottom] = self.borders;
        let (a, b) = match slot {
            0 => (left, top),
            1 => (left, bottom),
            2 => (right, bottom),
            3 => (right, top),
            _ => return None,
        };
        a.intersection_unrestricted(&b)
    }

    pub fn is_degenerate(&self) -> bool {
        self.corner_pts.iter().any(Option::is_none)
    }

    /// Provenance string, `left:<b>;right:<b>;top:<b>;bottom:<b>` where `<b>`
    /// is `true` for borders backed by detected lines.
    pub fn custom(&self) -> String {
        BorderPosition::ALL
            .iter()
            .map(|p| format!("{}:{}", p, self.source(*p).is_detected()))
            .join(";")
    }
}

/// Per-run counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchStats {
    pub horizontal_nodes: usize,
    pub vertical_nodes: usize,
    pub horizontal_clique: usize,
    pub vertical_clique: usize,
    pub merged_fragments: usize,
    pub reduced_nodes: usize,
    pub detected_borders: usize,
    pub inherited_borders: usize,
    pub synthesized_borders: usize,
}

/// The reconstructed table.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRegion {
    pub rows: usize,
    pub cols: usize,
    pub polygon: Polygon,
    /// Distinct cell corners shared between cells.
    pub corners: Vec<Point>,
    pub cells: Vec<TableCell>,
    pub stats: MatchStats,
}

impl TableRegion {
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn degenerate_cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter().filter(|c| c.is_degenerate())
    }
}
