//! Line candidate search for a single template border.

use crate::geometry::{EPSILON, Line, Orientation};

use super::types::{BorderPosition, LineCandidates, RawCell};

/// Finds detected lines that may realise a template border.
///
/// The finder borrows the detected lines of one orientation. Candidate
/// indices refer to positions in that slice.
#[derive(Debug, Clone, Copy)]
pub struct LineCandidateFinder<'a> {
    lines: &'a [Line],
    orientation: Orientation,
    min_overlap_ratio: f64,
}

impl<'a> LineCandidateFinder<'a> {
    pub fn new(lines: &'a [Line], orientation: Orientation) -> Self {
        Self {
            lines,
            orientation,
            min_overlap_ratio: 0.3,
        }
    }

    pub fn with_min_overlap_ratio(mut self, ratio: f64) -> Self {
        self.min_overlap_ratio = ratio;
        self
    }

    pub fn lines(&self) -> &'a [Line] {
        self.lines
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns every detected line closer than `search_radius` to the
    /// reference center that covers more than the minimum overlap ratio of
    /// the reference span.
    pub fn find(&self, reference: Line, search_radius: f64) -> LineCandidates {
        let reference = reference.sorted(self.orientation);
        let mut result = LineCandidates::new(reference);

        let ref_len = reference.length();
        if ref_len < EPSILON {
            return result;
        }
        let center = reference.center();

        for (idx, line) in self.lines.iter().enumerate() {
            let distance = line.distance(center);
            if distance >= search_radius {
                continue;
            }
            let overlap = reference.overlap(line, self.orientation);
            if overlap / ref_len > self.min_overlap_ratio {
                result.add_candidate(idx, overlap, distance);
            }
        }
        result
    }
}

/// Search radius for one border.
///
/// The smallest extent across the border among the cell itself and the
/// neighbours sharing it, never below `min_distance`. Borders on the table
/// edge have no neighbours and use `min_distance` directly.
pub fn search_radius(
    cells: &[RawCell],
    cell: usize,
    position: BorderPosition,
    min_distance: f64,
) -> f64 {
    let Some(own) = cells.get(cell) else {
        return min_distance;
    };
    let radius = own
        .neighbors(position)
        .iter()
        .filter_map(|&n| cells.get(n))
        .map(|n| n.extent(position))
        .fold(f64::MAX, f64::min);

    if radius == f64::MAX {
        min_distance
    } else {
        radius.min(own.extent(position)).max(min_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_reference_finds_nothing() {
        let lines = [Line::from_coords(0.0, 0.0, 100.0, 0.0)];
        let finder = LineCandidateFinder::new(&lines, Orientation::Horizontal);
        let found = finder.find(Line::from_coords(5.0, 0.0, 5.0, 0.0), 50.0);
        assert!(found.is_empty());
    }

    #[test]
    fn reference_is_stored_sorted() {
        let lines: [Line; 0] = [];
        let finder = LineCandidateFinder::new(&lines, Orientation::Vertical);
        let found = finder.find(Line::from_coords(0.0, 90.0, 0.0, 10.0), 50.0);
        assert_eq!(found.reference_line(), Line::from_coords(0.0, 10.0, 0.0, 90.0));
    }
}
