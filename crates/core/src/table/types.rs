//! Table template and raw cell types.

use std::cmp::Reverse;
use std::fmt;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::geometry::{BBox, Line, Orientation, Polygon};

/// One of the four sides of a table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BorderPosition {
    Left,
    Right,
    Top,
    Bottom,
}

impl BorderPosition {
    /// Fixed left, right, top, bottom order used for arrays and provenance.
    pub const ALL: [BorderPosition; 4] = [
        BorderPosition::Left,
        BorderPosition::Right,
        BorderPosition::Top,
        BorderPosition::Bottom,
    ];

    pub const fn index(self) -> usize {
        match self {
            BorderPosition::Left => 0,
            BorderPosition::Right => 1,
            BorderPosition::Top => 2,
            BorderPosition::Bottom => 3,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            BorderPosition::Left => BorderPosition::Right,
            BorderPosition::Right => BorderPosition::Left,
            BorderPosition::Top => BorderPosition::Bottom,
            BorderPosition::Bottom => BorderPosition::Top,
        }
    }

    /// Orientation of the border line itself: top and bottom borders are
    /// horizontal lines.
    pub const fn orientation(self) -> Orientation {
        match self {
            BorderPosition::Left | BorderPosition::Right => Orientation::Vertical,
            BorderPosition::Top | BorderPosition::Bottom => Orientation::Horizontal,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BorderPosition::Left => "left",
            BorderPosition::Right => "right",
            BorderPosition::Top => "top",
            BorderPosition::Bottom => "bottom",
        }
    }
}

impl fmt::Display for BorderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected line accepted for one border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineCandidate {
    /// Index into the detected line list of the border's orientation.
    pub index: usize,
    pub overlap: f64,
    pub distance: f64,
}

/// The detected lines matched to one (cell, border) pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineCandidates {
    reference_line: Line,
    candidates: Vec<LineCandidate>,
}

impl LineCandidates {
    pub fn new(reference_line: Line) -> Self {
        Self {
            reference_line,
            candidates: Vec::new(),
        }
    }

    pub fn reference_line(&self) -> Line {
        self.reference_line
    }

    pub fn set_reference_line(&mut self, line: Line) {
        self.reference_line = line;
    }

    pub fn add_candidate(&mut self, index: usize, overlap: f64, distance: f64) {
        self.candidates.push(LineCandidate {
            index,
            overlap,
            distance,
        });
    }

    pub fn candidates(&self) -> &[LineCandidate] {
        &self.candidates
    }

    pub fn candidate_indices(&self) -> Vec<usize> {
        self.candidates.iter().map(|c| c.index).collect()
    }

    pub fn overlaps(&self) -> Vec<f64> {
        self.candidates.iter().map(|c| c.overlap).collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.candidates.iter().map(|c| c.distance).collect()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    /// Unions `other` into `self`, skipping line indices already present.
    pub fn merge(&mut self, other: &LineCandidates) {
        for c in &other.candidates {
            if !self.candidates.iter().any(|own| own.index == c.index) {
                self.candidates.push(*c);
            }
        }
    }

    /// Candidate line indices, largest overlap first.
    pub fn sort_by_overlap(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .sorted_by_key(|c| Reverse(OrderedFloat(c.overlap)))
            .map(|c| c.index)
            .collect()
    }

    /// Candidate line indices, smallest distance first.
    pub fn sort_by_distance(&self) -> Vec<usize> {
        self.candidates
            .iter()
            .sorted_by_key(|c| OrderedFloat(c.distance))
            .map(|c| c.index)
            .collect()
    }

    /// Resolves the candidates against their detected line list.
    pub fn lines<'a>(&'a self, detected: &'a [Line]) -> impl Iterator<Item = &'a Line> + 'a {
        self.candidates.iter().filter_map(|c| detected.get(c.index))
    }
}

/// A template cell as delivered by the template parser.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateCell {
    pub id: String,
    pub row: usize,
    pub col: usize,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub row_span: usize,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub col_span: usize,
    #[cfg_attr(feature = "serde", serde(default = "visible"))]
    pub left_visible: bool,
    #[cfg_attr(feature = "serde", serde(default = "visible"))]
    pub right_visible: bool,
    #[cfg_attr(feature = "serde", serde(default = "visible"))]
    pub top_visible: bool,
    #[cfg_attr(feature = "serde", serde(default = "visible"))]
    pub bottom_visible: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub header: bool,
    /// Reference polygon in template coordinates (UL, BL, BR, UR).
    pub polygon: Polygon,
}

#[cfg(feature = "serde")]
fn one() -> usize {
    1
}

#[cfg(feature = "serde")]
fn visible() -> bool {
    true
}

impl TemplateCell {
    /// A cell with unit spans and all borders visible.
    pub fn new(id: impl Into<String>, row: usize, col: usize, polygon: Polygon) -> Self {
        Self {
            id: id.into(),
            row,
            col,
            row_span: 1,
            col_span: 1,
            left_visible: true,
            right_visible: true,
            top_visible: true,
            bottom_visible: true,
            header: false,
            polygon,
        }
    }

    pub fn with_span(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    pub fn with_border_visible(mut self, position: BorderPosition, visible: bool) -> Self {
        match position {
            BorderPosition::Left => self.left_visible = visible,
            BorderPosition::Right => self.right_visible = visible,
            BorderPosition::Top => self.top_visible = visible,
            BorderPosition::Bottom => self.bottom_visible = visible,
        }
        self
    }
}

/// The a-priori table layout: grid size, outer polygon and cells.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableTemplate {
    pub rows: usize,
    pub cols: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub polygon: Polygon,
    pub cells: Vec<TemplateCell>,
}

/// A template cell linked to its neighbours, carrying the line candidates
/// of its four borders.
#[derive(Clone, Debug)]
pub struct RawCell {
    pub id: String,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
    pub header: bool,
    visible: [bool; 4],
    polygon: Polygon,
    bbox: BBox,
    neighbors: [SmallVec<[usize; 2]>; 4],
    candidates: [LineCandidates; 4],
}

impl RawCell {
    pub fn from_template(cell: &TemplateCell) -> Self {
        let bbox = cell.polygon.bbox().unwrap_or(BBox {
            x0: 0.0,
            top: 0.0,
            x1: 0.0,
            bottom: 0.0,
        });
        Self {
            id: cell.id.clone(),
            row: cell.row,
            col: cell.col,
            row_span: cell.row_span.max(1),
            col_span: cell.col_span.max(1),
            header: cell.header,
            visible: [
                cell.left_visible,
                cell.right_visible,
                cell.top_visible,
                cell.bottom_visible,
            ],
            polygon: cell.polygon.clone(),
            bbox,
            neighbors: Default::default(),
            candidates: Default::default(),
        }
    }

    pub fn border_visible(&self, position: BorderPosition) -> bool {
        self.visible[position.index()]
    }

    /// Template polygon until reconstruction, the reconstructed polygon
    /// afterwards.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub(crate) fn set_polygon(&mut self, polygon: Polygon) {
        self.polygon = polygon;
    }

    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.bbox.height()
    }

    /// Template extent across a border: width for left/right borders,
    /// height for top/bottom borders.
    pub fn extent(&self, position: BorderPosition) -> f64 {
        match position.orientation() {
            Orientation::Vertical => self.width(),
            Orientation::Horizontal => self.height(),
        }
    }

    pub fn last_row(&self) -> usize {
        self.row + self.row_span
    }

    pub fn last_col(&self) -> usize {
        self.col + self.col_span
    }

    /// Index of the grid line this border lies on: column boundaries for
    /// left/right, row boundaries for top/bottom.
    pub fn gridline(&self, position: BorderPosition) -> usize {
        match position {
            BorderPosition::Left => self.col,
            BorderPosition::Right => self.last_col(),
            BorderPosition::Top => self.row,
            BorderPosition::Bottom => self.last_row(),
        }
    }

    pub fn rows_overlap(&self, other: &RawCell) -> bool {
        self.row < other.last_row() && other.row < self.last_row()
    }

    pub fn cols_overlap(&self, other: &RawCell) -> bool {
        self.col < other.last_col() && other.col < self.last_col()
    }

    /// Template border line, oriented left-to-right or top-to-bottom.
    pub fn border_line(&self, position: BorderPosition) -> Line {
        let Some([ul, bl, br, ur]) = self.polygon.corners() else {
            return Line::default();
        };
        let line = match position {
            BorderPosition::Left => Line::new(ul, bl),
            BorderPosition::Right => Line::new(ur, br),
            BorderPosition::Top => Line::new(ul, ur),
            BorderPosition::Bottom => Line::new(bl, br),
        };
        line.sorted(position.orientation())
    }

    pub fn neighbors(&self, position: BorderPosition) -> &[usize] {
        &self.neighbors[position.index()]
    }

    pub fn has_neighbor(&self, position: BorderPosition) -> bool {
        !self.neighbors[position.index()].is_empty()
    }

    pub(crate) fn add_neighbor(&mut self, position: BorderPosition, idx: usize) {
        let list = &mut self.neighbors[position.index()];
        if !list.contains(&idx) {
            list.push(idx);
            list.sort_unstable();
        }
    }

    pub fn line_candidates(&self, position: BorderPosition) -> &LineCandidates {
        &self.candidates[position.index()]
    }

    pub(crate) fn line_candidates_mut(&mut self, position: BorderPosition) -> &mut LineCandidates {
        &mut self.candidates[position.index()]
    }

    pub fn set_line_candidates(&mut self, position: BorderPosition, candidates: LineCandidates) {
        self.candidates[position.index()] = candidates;
    }

    pub(crate) fn clear_line_candidates(&mut self) {
        for c in &mut self.candidates {
            c.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn opposite_is_an_involution() {
        for p in BorderPosition::ALL {
            assert_eq!(p.opposite().opposite(), p);
            assert_ne!(p.opposite(), p);
            assert_eq!(p.opposite().orientation(), p.orientation());
            assert_eq!(BorderPosition::ALL[p.index()], p);
        }
    }

    #[test]
    fn candidate_orderings() {
        let mut lc = LineCandidates::new(Line::default());
        lc.add_candidate(4, 10.0, 3.0);
        lc.add_candidate(7, 30.0, 5.0);
        lc.add_candidate(1, 20.0, 1.0);
        assert_eq!(lc.sort_by_overlap(), vec![7, 1, 4]);
        assert_eq!(lc.sort_by_distance(), vec![1, 4, 7]);
        assert_eq!(lc.candidate_indices().len(), lc.overlaps().len());
        assert_eq!(lc.overlaps().len(), lc.distances().len());
    }

    #[test]
    fn merge_skips_duplicates() {
        let mut a = LineCandidates::new(Line::default());
        a.add_candidate(1, 1.0, 1.0);
        let mut b = LineCandidates::new(Line::default());
        b.add_candidate(1, 2.0, 2.0);
        b.add_candidate(2, 2.0, 2.0);
        a.merge(&b);
        assert_eq!(a.candidate_indices(), vec![1, 2]);
    }

    #[test]
    fn border_lines_follow_polygon_corners() {
        let cell = TemplateCell::new(
            "c",
            0,
            0,
            Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 50.0),
                Point::new(80.0, 50.0),
                Point::new(80.0, 0.0),
            ]),
        );
        let raw = RawCell::from_template(&cell);
        assert_eq!(
            raw.border_line(BorderPosition::Right),
            Line::from_coords(80.0, 0.0, 80.0, 50.0)
        );
        assert_eq!(
            raw.border_line(BorderPosition::Bottom),
            Line::from_coords(0.0, 50.0, 80.0, 50.0)
        );
        assert_eq!(raw.extent(BorderPosition::Left), 80.0);
        assert_eq!(raw.extent(BorderPosition::Top), 50.0);
    }
}
