//! Association graph over border-to-line matches.
//!
//! Every node pairs one template border with one detected line. Edges join
//! nodes that can hold at the same time in one consistent table; the
//! maximum clique of the graph is the accepted set of matches.

use tracing::{debug, trace};

use crate::geometry::{EPSILON, Line, Offset, Orientation};

use super::candidates::{LineCandidateFinder, search_radius};
use super::clique::maximum_clique;
use super::params::MatchConfig;
use super::types::{BorderPosition, RawCell};

/// One candidate match of a template border.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGraphNode {
    /// Owning cell.
    pub cell: usize,
    /// Further cells whose border on the same gridline matched the same line.
    pub extra_cells: Vec<usize>,
    pub position: BorderPosition,
    /// Grid line index of the border, see [`RawCell::gridline`].
    pub gridline: usize,
    /// Template border in image coordinates.
    pub reference_line: Line,
    pub matched_line: Line,
    pub matched_index: usize,
    /// Shorter colinear fragments absorbed into this node, with their
    /// indices into the detected line list.
    pub broken: Vec<(usize, Line)>,
    pub overlap: f64,
    pub distance: f64,
    pub adjacency: Vec<usize>,
}

impl AssociationGraphNode {
    pub fn new(
        cell: usize,
        position: BorderPosition,
        gridline: usize,
        reference_line: Line,
        matched_index: usize,
        matched_line: Line,
    ) -> Self {
        let orientation = position.orientation();
        Self {
            cell,
            extra_cells: Vec::new(),
            position,
            gridline,
            reference_line,
            matched_line,
            matched_index,
            broken: Vec::new(),
            overlap: reference_line.overlap(&matched_line, orientation),
            distance: matched_line.distance(reference_line.center()),
            adjacency: Vec::new(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.position.orientation()
    }

    /// All cells owning this border, primary cell first.
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(self.cell).chain(self.extra_cells.iter().copied())
    }

    /// Matched line followed by the broken fragments.
    pub fn lines(&self) -> impl Iterator<Item = (usize, Line)> + '_ {
        std::iter::once((self.matched_index, self.matched_line)).chain(self.broken.iter().copied())
    }

    pub fn owns_cell(&self, cell: usize) -> bool {
        self.cell == cell || self.extra_cells.contains(&cell)
    }

    /// True when both nodes stand for the same side of at least one cell.
    pub fn shares_border(&self, other: &AssociationGraphNode) -> bool {
        self.position == other.position && other.cells().any(|c| self.owns_cell(c))
    }

    pub fn contains_line(&self, index: usize) -> bool {
        self.matched_index == index || self.broken.iter().any(|(i, _)| *i == index)
    }

    /// Takes over the fragments of `other`. The longer matched line stays
    /// primary, the shorter one becomes a broken fragment.
    fn absorb(&mut self, other: &AssociationGraphNode) {
        if other.matched_line.length() > self.matched_line.length() {
            self.broken.push((self.matched_index, self.matched_line));
            self.matched_index = other.matched_index;
            self.matched_line = other.matched_line;
            self.overlap = other.overlap;
            self.distance = other.distance;
        } else if !self.contains_line(other.matched_index) {
            self.broken.push((other.matched_index, other.matched_line));
        }
        for &(idx, line) in &other.broken {
            if !self.contains_line(idx) {
                self.broken.push((idx, line));
            }
        }
    }
}

/// Position of a line across its orientation: y for horizontal lines,
/// x for vertical ones.
fn across(line: &Line, orientation: Orientation) -> f64 {
    let c = line.center();
    match orientation {
        Orientation::Horizontal => c.y,
        Orientation::Vertical => c.x,
    }
}

/// Merges colinear or touching fragments into single nodes.
///
/// Runs until no pair of remaining nodes is colinear or close, so a second
/// call on the result merges nothing. Returns the number of absorbed nodes.
pub fn merge_colinear(nodes: &mut Vec<AssociationGraphNode>, threshold: f64) -> usize {
    let mut merged = 0;
    loop {
        let mut consumed = vec![false; nodes.len()];
        let mut pass = 0;
        for i in 0..nodes.len() {
            if consumed[i] {
                continue;
            }
            let mut changed = true;
            while changed {
                changed = false;
                for j in (i + 1)..nodes.len() {
                    if consumed[j] {
                        continue;
                    }
                    let (head, tail) = nodes.split_at_mut(j);
                    let (keep, other) = (&mut head[i], &tail[0]);
                    let (a, b) = (&keep.matched_line, &other.matched_line);
                    if a.is_colinear(b, threshold) || a.is_close(b, threshold) {
                        keep.absorb(other);
                        consumed[j] = true;
                        pass += 1;
                        changed = true;
                    }
                }
            }
        }
        if pass == 0 {
            break;
        }
        merged += pass;
        let mut flags = consumed.into_iter();
        nodes.retain(|_| !flags.next().unwrap_or(false));
    }
    merged
}

/// Folds nodes of different cells that match the same detected line on the
/// same gridline and side into one node owning all those cells.
pub fn reduce_nodes(nodes: &mut Vec<AssociationGraphNode>) -> usize {
    let mut reduced = 0;
    let mut i = 0;
    while i < nodes.len() {
        let mut j = i + 1;
        while j < nodes.len() {
            let same = nodes[i].position == nodes[j].position
                && nodes[i].gridline == nodes[j].gridline
                && nodes[i].matched_index == nodes[j].matched_index
                && nodes[i].cell != nodes[j].cell;
            if same {
                let other = nodes.remove(j);
                let keep = &mut nodes[i];
                for cell in other.cells() {
                    if cell != keep.cell && !keep.extra_cells.contains(&cell) {
                        keep.extra_cells.push(cell);
                    }
                }
                for (idx, line) in other.broken {
                    if !keep.contains_line(idx) {
                        keep.broken.push((idx, line));
                    }
                }
                reduced += 1;
            } else {
                j += 1;
            }
        }
        i += 1;
    }
    reduced
}

/// Symmetric consistency test between two nodes of one orientation.
///
/// Nodes of the same border, including reduced nodes owning that border
/// among others, are adjacent when their lines do not overlap and lie
/// within `distance_threshold` of each other. Nodes of different
/// cells on the same gridline are adjacent when their matched lines are
/// less than three thresholds apart. Nodes on different gridlines are
/// adjacent when the matched spacing keeps the order of the reference
/// spacing and their ratio stays inside the variation band.
pub fn is_adjacent(
    a: &AssociationGraphNode,
    b: &AssociationGraphNode,
    config: &MatchConfig,
) -> bool {
    let orientation = a.orientation();
    if orientation != b.orientation() {
        return false;
    }

    let matched_gap =
        (across(&a.matched_line, orientation) - across(&b.matched_line, orientation)).abs();

    if a.shares_border(b) {
        let overlap = a.matched_line.overlap(&b.matched_line, orientation);
        return overlap <= EPSILON && matched_gap < config.distance_threshold;
    }

    if a.gridline == b.gridline {
        if a.position != b.position {
            debug!(
                cell_a = a.cell,
                cell_b = b.cell,
                gridline = a.gridline,
                "opposite borders share a gridline, treated as one gridline"
            );
        }
        return matched_gap < 3.0 * config.distance_threshold;
    }

    let ref_sep = across(&b.reference_line, orientation) - across(&a.reference_line, orientation);
    let matched_sep = across(&b.matched_line, orientation) - across(&a.matched_line, orientation);
    if ref_sep.abs() < EPSILON || ref_sep.signum() != matched_sep.signum() {
        return false;
    }
    let ratio = matched_sep / ref_sep;
    let (lo, hi) = config.scale_range();
    lo <= ratio && ratio <= hi
}

/// Rebuilds the adjacency lists of all nodes.
pub fn connect(nodes: &mut [AssociationGraphNode], config: &MatchConfig) -> usize {
    for n in nodes.iter_mut() {
        n.adjacency.clear();
    }
    let mut edges = 0;
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let adjacent = is_adjacent(&nodes[i], &nodes[j], config);
            trace!(i, j, adjacent, "adjacency");
            if adjacent {
                nodes[i].adjacency.push(j);
                nodes[j].adjacency.push(i);
                edges += 1;
            }
        }
    }
    edges
}

/// Association graph of one orientation.
#[derive(Debug, Clone)]
pub struct AssociationGraph {
    orientation: Orientation,
    nodes: Vec<AssociationGraphNode>,
    merged_fragments: usize,
    reduced_nodes: usize,
}

impl AssociationGraph {
    /// Creates, merges, reduces and connects the nodes of all borders of
    /// `orientation`.
    ///
    /// Left and top borders of cells with a neighbour on that side are
    /// skipped: the neighbour's right or bottom border covers them. Hidden
    /// borders are not searched.
    pub fn build(
        cells: &[RawCell],
        lines: &[Line],
        orientation: Orientation,
        offset: Offset,
        config: &MatchConfig,
    ) -> Self {
        let finder = LineCandidateFinder::new(lines, orientation)
            .with_min_overlap_ratio(config.min_overlap_ratio);
        let shift = offset.to_point();

        let mut nodes = Vec::new();
        let mut merged_fragments = 0;
        for (ci, cell) in cells.iter().enumerate() {
            for position in BorderPosition::ALL {
                if position.orientation() != orientation || !cell.border_visible(position) {
                    continue;
                }
                let shared = matches!(position, BorderPosition::Left | BorderPosition::Top)
                    && cell.has_neighbor(position);
                if shared {
                    continue;
                }

                let reference = cell.border_line(position).translated(shift);
                let radius = search_radius(cells, ci, position, config.distance_threshold);
                let found = finder.find(reference, radius);
                let reference = found.reference_line();

                let mut border_nodes: Vec<AssociationGraphNode> = found
                    .candidates()
                    .iter()
                    .filter_map(|c| {
                        let line = lines.get(c.index)?;
                        let mut node = AssociationGraphNode::new(
                            ci,
                            position,
                            cell.gridline(position),
                            reference,
                            c.index,
                            *line,
                        );
                        node.overlap = c.overlap;
                        node.distance = c.distance;
                        Some(node)
                    })
                    .collect();
                merged_fragments += merge_colinear(&mut border_nodes, config.colinear_threshold);
                nodes.append(&mut border_nodes);
            }
        }

        let created = nodes.len();
        let reduced_nodes = reduce_nodes(&mut nodes);
        let edges = connect(&mut nodes, config);
        debug!(
            ?orientation,
            created,
            merged_fragments,
            reduced_nodes,
            nodes = nodes.len(),
            edges,
            "association graph built"
        );

        Self {
            orientation,
            nodes,
            merged_fragments,
            reduced_nodes,
        }
    }

    /// Wraps prepared nodes and connects them.
    pub fn from_nodes(
        orientation: Orientation,
        mut nodes: Vec<AssociationGraphNode>,
        config: &MatchConfig,
    ) -> Self {
        connect(&mut nodes, config);
        Self {
            orientation,
            nodes,
            merged_fragments: 0,
            reduced_nodes: 0,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn nodes(&self) -> &[AssociationGraphNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn merged_fragments(&self) -> usize {
        self.merged_fragments
    }

    pub fn reduced_nodes(&self) -> usize {
        self.reduced_nodes
    }

    /// Node indices of one maximum clique, ascending.
    pub fn maximum_clique(&self) -> Vec<usize> {
        let adjacency: Vec<&[usize]> = self.nodes.iter().map(|n| n.adjacency.as_slice()).collect();
        let clique = maximum_clique(&adjacency);
        debug!(
            orientation = ?self.orientation,
            nodes = self.len(),
            clique = clique.len(),
            "clique solved"
        );
        clique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hnode(
        cell: usize,
        gridline: usize,
        y: f64,
        x0: f64,
        x1: f64,
        index: usize,
    ) -> AssociationGraphNode {
        AssociationGraphNode::new(
            cell,
            BorderPosition::Bottom,
            gridline,
            Line::from_coords(0.0, y, 100.0, y),
            index,
            Line::from_coords(x0, y, x1, y),
        )
    }

    #[test]
    fn longer_fragment_becomes_primary() {
        let mut nodes = vec![hnode(0, 1, 50.0, 0.0, 20.0, 0), hnode(0, 1, 51.0, 30.0, 100.0, 1)];
        assert_eq!(merge_colinear(&mut nodes, 10.0), 1);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].matched_index, 1);
        assert_eq!(nodes[0].broken.len(), 1);
        assert_eq!(nodes[0].broken[0].0, 0);
    }

    #[test]
    fn reduce_folds_cells_on_one_gridline() {
        let mut nodes = vec![hnode(0, 1, 50.0, 0.0, 200.0, 3), hnode(1, 1, 50.0, 0.0, 200.0, 3)];
        assert_eq!(reduce_nodes(&mut nodes), 1);
        assert_eq!(nodes[0].cells().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn split_border_without_overlap_is_adjacent() {
        let config = MatchConfig::default();
        let a = hnode(0, 1, 50.0, 0.0, 40.0, 0);
        let b = hnode(0, 1, 58.0, 60.0, 100.0, 1);
        let c = hnode(0, 1, 58.0, 30.0, 100.0, 2);
        assert!(is_adjacent(&a, &b, &config));
        assert!(!is_adjacent(&a, &c, &config));
    }
}
