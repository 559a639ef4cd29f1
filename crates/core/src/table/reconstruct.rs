//! Table reconstruction from the selected border matches.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::geometry::{Line, LineFitting, Offset, Orientation, Point, Polygon};

use super::graph::AssociationGraph;
use super::region::{BorderSource, TableCell};
use super::types::{BorderPosition, LineCandidates, RawCell};

/// Output of [`TableReconstructor::reconstruct`].
#[derive(Debug, Clone, Default)]
pub struct Reconstruction {
    pub cells: Vec<TableCell>,
    pub corners: Vec<Point>,
    pub detected: usize,
    pub inherited: usize,
    pub synthesized: usize,
}

/// Turns clique selections back into cell polygons.
#[derive(Debug, Clone, Copy)]
pub struct TableReconstructor<'a> {
    horizontal: &'a [Line],
    vertical: &'a [Line],
    offset: Offset,
}

impl<'a> TableReconstructor<'a> {
    pub fn new(horizontal: &'a [Line], vertical: &'a [Line], offset: Offset) -> Self {
        Self {
            horizontal,
            vertical,
            offset,
        }
    }

    fn lines(&self, orientation: Orientation) -> &'a [Line] {
        match orientation {
            Orientation::Horizontal => self.horizontal,
            Orientation::Vertical => self.vertical,
        }
    }

    /// Runs the whole reconstruction: assignment of clique nodes, neighbour
    /// propagation, border synthesis and corner intersection.
    pub fn reconstruct(
        &self,
        cells: &mut [RawCell],
        selections: &[(&AssociationGraph, &[usize])],
    ) -> Reconstruction {
        for cell in cells.iter_mut() {
            cell.clear_line_candidates();
        }
        let mut sources: Vec<[Option<BorderSource>; 4]> = vec![[None; 4]; cells.len()];

        for (graph, clique) in selections {
            self.assign(cells, &mut sources, graph, clique);
        }
        propagate(cells, &mut sources);

        let mut out = Reconstruction::default();
        let mut corner_ids: FxHashMap<(i64, i64), usize> = FxHashMap::default();
        let mut polygons = Vec::with_capacity(cells.len());

        for (ci, cell) in cells.iter().enumerate() {
            let (borders, cell_sources) = self.cell_borders(cells, ci, &sources[ci]);
            for s in cell_sources {
                match s {
                    BorderSource::Detected => out.detected += 1,
                    BorderSource::Inherited => out.inherited += 1,
                    _ => out.synthesized += 1,
                }
            }

            let [left, right, top, bottom] = borders;
            let corners = [
                left.intersection_unrestricted(&top),
                left.intersection_unrestricted(&bottom),
                right.intersection_unrestricted(&bottom),
                right.intersection_unrestricted(&top),
            ];
            if corners.iter().any(Option::is_none) {
                warn!(cell = %cell.id, "parallel cell borders, polygon is degenerate");
            }

            let mut corner_pts = [None; 4];
            for (slot, corner) in corner_pts.iter_mut().zip(corners) {
                *slot = corner.map(|p| {
                    let key = ((p.x * 1e6).round() as i64, (p.y * 1e6).round() as i64);
                    *corner_ids.entry(key).or_insert_with(|| {
                        out.corners.push(p);
                        out.corners.len() - 1
                    })
                });
            }
            let template = cell.polygon().translated(self.offset.to_point());
            let polygon = cell_polygon(&corners, &template);
            polygons.push(polygon.clone());

            out.cells.push(TableCell {
                id: cell.id.clone(),
                row: cell.row,
                col: cell.col,
                row_span: cell.row_span,
                col_span: cell.col_span,
                header: cell.header,
                polygon,
                corner_pts,
                borders,
                sources: cell_sources,
            });
        }

        for (cell, polygon) in cells.iter_mut().zip(polygons) {
            cell.set_polygon(polygon);
        }

        debug!(
            cells = out.cells.len(),
            detected = out.detected,
            inherited = out.inherited,
            synthesized = out.synthesized,
            "table reconstructed"
        );
        out
    }

    /// Copies the lines of every selected node onto its owning cells.
    fn assign(
        &self,
        cells: &mut [RawCell],
        sources: &mut [[Option<BorderSource>; 4]],
        graph: &AssociationGraph,
        clique: &[usize],
    ) {
        for node in clique.iter().filter_map(|&i| graph.nodes().get(i)) {
            let reference = node.reference_line;
            let orientation = node.orientation();
            for ci in node.cells() {
                let Some(cell) = cells.get_mut(ci) else {
                    continue;
                };
                let lc = cell.line_candidates_mut(node.position);
                if lc.is_empty() {
                    lc.set_reference_line(reference);
                }
                for (idx, line) in node.lines() {
                    if !lc.candidate_indices().contains(&idx) {
                        lc.add_candidate(
                            idx,
                            reference.overlap(&line, orientation),
                            line.distance(reference.center()),
                        );
                    }
                }
                sources[ci][node.position.index()] = Some(BorderSource::Detected);
            }
        }
    }

    /// Final border lines and their sources for one cell.
    fn cell_borders(
        &self,
        cells: &[RawCell],
        ci: usize,
        known: &[Option<BorderSource>; 4],
    ) -> ([Line; 4], [BorderSource; 4]) {
        let cell = &cells[ci];
        let mut lines: [Option<Line>; 4] = [None; 4];
        let mut sources = [BorderSource::Template; 4];

        for p in BorderPosition::ALL {
            let detected = self.lines(p.orientation());
            let lc = cell.line_candidates(p);
            if !lc.is_empty() {
                lines[p.index()] = fit_border(lc, detected);
                sources[p.index()] = known[p.index()].unwrap_or(BorderSource::Detected);
                continue;
            }

            let mut merged = LineCandidates::new(lc.reference_line());
            for side in perpendicular_sides(p) {
                for &n in cell.neighbors(side) {
                    let other = &cells[n];
                    if other.gridline(p) == cell.gridline(p) {
                        merged.merge(other.line_candidates(p));
                    }
                }
            }
            if let Some(line) = fit_border(&merged, detected) {
                lines[p.index()] = Some(line);
                sources[p.index()] = BorderSource::Neighbor;
            }
        }

        let found = lines;
        for p in BorderPosition::ALL {
            if found[p.index()].is_some() {
                continue;
            }
            let fallback = match found[p.opposite().index()] {
                Some(opposite) => {
                    let extent = cell.extent(p);
                    let sign = match p {
                        BorderPosition::Left | BorderPosition::Top => -1.0,
                        BorderPosition::Right | BorderPosition::Bottom => 1.0,
                    };
                    let shift = match p.orientation() {
                        Orientation::Vertical => Point::new(sign * extent, 0.0),
                        Orientation::Horizontal => Point::new(0.0, sign * extent),
                    };
                    (opposite.translated(shift), BorderSource::Mirrored)
                }
                None => (
                    cell.border_line(p).translated(self.offset.to_point()),
                    BorderSource::Template,
                ),
            };
            lines[p.index()] = Some(fallback.0);
            sources[p.index()] = fallback.1;
        }

        for p in BorderPosition::ALL {
            let source = sources[p.index()];
            if source.is_synthesized() {
                if cell.border_visible(p) {
                    warn!(
                        cell = %cell.id,
                        border = %p,
                        fallback = %source,
                        "no detected line for border"
                    );
                } else {
                    debug!(
                        cell = %cell.id,
                        border = %p,
                        fallback = %source,
                        "hidden border synthesized"
                    );
                }
            }
        }

        let borders = lines.map(|l| l.unwrap_or_default());
        (borders, sources)
    }
}

/// Sides whose neighbours share the gridline of a border at `position`.
fn perpendicular_sides(position: BorderPosition) -> [BorderPosition; 2] {
    match position.orientation() {
        Orientation::Vertical => [BorderPosition::Top, BorderPosition::Bottom],
        Orientation::Horizontal => [BorderPosition::Left, BorderPosition::Right],
    }
}

/// Fills empty left/top borders from the right/bottom candidates of the
/// neighbours on that side, then empty right/bottom borders from the
/// neighbours' left/top candidates.
fn propagate(cells: &mut [RawCell], sources: &mut [[Option<BorderSource>; 4]]) {
    let passes = [
        [BorderPosition::Left, BorderPosition::Top],
        [BorderPosition::Right, BorderPosition::Bottom],
    ];
    let mut inherited = 0;
    for positions in passes {
        for ci in 0..cells.len() {
            for p in positions {
                if !cells[ci].line_candidates(p).is_empty() {
                    continue;
                }
                let mut merged = LineCandidates::new(cells[ci].line_candidates(p).reference_line());
                for &n in cells[ci].neighbors(p) {
                    merged.merge(cells[n].line_candidates(p.opposite()));
                }
                if !merged.is_empty() {
                    cells[ci].set_line_candidates(p, merged);
                    sources[ci][p.index()] = Some(BorderSource::Inherited);
                    inherited += 1;
                }
            }
        }
    }
    debug!(inherited, "neighbour borders propagated");
}

/// Fits one line through all candidate lines of a border.
///
/// The result carries the thickness of the longest candidate. A single
/// candidate is returned unchanged.
/// Four-point cell polygon. Missing intersections take the matching corner
/// of the translated template polygon.
fn cell_polygon(corners: &[Option<Point>; 4], template: &Polygon) -> Polygon {
    let fallback = template.corners().unwrap_or_default();
    Polygon::new(corners.iter().zip(fallback).map(|(c, t)| c.unwrap_or(t)).collect())
}

fn fit_border(candidates: &LineCandidates, detected: &[Line]) -> Option<Line> {
    let lines: Vec<Line> = candidates.lines(detected).copied().collect();
    let longest = lines
        .iter()
        .copied()
        .max_by(|a, b| a.length().total_cmp(&b.length()))?;
    if lines.len() == 1 {
        return Some(longest);
    }
    let fitted = LineFitting::from_lines(&lines)
        .fit_line()
        .unwrap_or(longest);
    Some(fitted.with_thickness(longest.thickness()))
}
