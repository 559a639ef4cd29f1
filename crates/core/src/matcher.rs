//! Template matching entry points.

use tracing::debug;

use crate::error::{MatchError, Result};
use crate::geometry::{Line, Offset, Orientation, Point, Polygon};
use crate::table::{
    AssociationGraph, MatchConfig, MatchStats, TableCell, TableReconstructor, TableRegion,
    TableTemplate, build_raw_table,
};

/// Matches a table template against detected lines.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    template: Option<TableTemplate>,
    config: MatchConfig,
}

impl TemplateMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            template: None,
            config,
        }
    }

    pub fn with_template(mut self, template: TableTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn set_template(&mut self, template: TableTemplate) {
        self.template = Some(template);
    }

    pub fn template(&self) -> Option<&TableTemplate> {
        self.template.as_ref()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Runs one matching pass.
    ///
    /// Fails only on configuration problems. Borders without any matching
    /// line are synthesized and reported in the cell provenance.
    pub fn run(
        &self,
        horizontal: &[Line],
        vertical: &[Line],
        offset: Offset,
    ) -> Result<TableRegion> {
        let template = self.template.as_ref().ok_or(MatchError::NoTemplate)?;
        self.config.validate()?;
        template.validate()?;

        let mut cells = build_raw_table(&template.cells);

        let solve = |orientation: Orientation, lines: &[Line]| {
            let graph = AssociationGraph::build(&cells, lines, orientation, offset, &self.config);
            let clique = graph.maximum_clique();
            (graph, clique)
        };
        let ((h_graph, h_clique), (v_graph, v_clique)) = if self.config.parallel {
            rayon::join(
                || solve(Orientation::Horizontal, horizontal),
                || solve(Orientation::Vertical, vertical),
            )
        } else {
            (
                solve(Orientation::Horizontal, horizontal),
                solve(Orientation::Vertical, vertical),
            )
        };

        let reconstructor = TableReconstructor::new(horizontal, vertical, offset);
        let rec = reconstructor.reconstruct(
            &mut cells,
            &[(&h_graph, h_clique.as_slice()), (&v_graph, v_clique.as_slice())],
        );

        let polygon = outer_polygon(&rec.cells, template.rows, template.cols)
            .unwrap_or_else(|| template.polygon.translated(offset.to_point()));

        let stats = MatchStats {
            horizontal_nodes: h_graph.len(),
            vertical_nodes: v_graph.len(),
            horizontal_clique: h_clique.len(),
            vertical_clique: v_clique.len(),
            merged_fragments: h_graph.merged_fragments() + v_graph.merged_fragments(),
            reduced_nodes: h_graph.reduced_nodes() + v_graph.reduced_nodes(),
            detected_borders: rec.detected,
            inherited_borders: rec.inherited,
            synthesized_borders: rec.synthesized,
        };
        debug!(?stats, "template matched");

        Ok(TableRegion {
            rows: template.rows,
            cols: template.cols,
            polygon,
            corners: rec.corners,
            cells: rec.cells,
            stats,
        })
    }
}

/// Table outline from the outer corners of the corner cells.
fn outer_polygon(cells: &[TableCell], rows: usize, cols: usize) -> Option<Polygon> {
    let ul = corner_of(cells, 0, |c| c.row == 0 && c.col == 0)?;
    let bl = corner_of(cells, 1, |c| c.row + c.row_span == rows && c.col == 0)?;
    let br = corner_of(cells, 2, |c| {
        c.row + c.row_span == rows && c.col + c.col_span == cols
    })?;
    let ur = corner_of(cells, 3, |c| c.row == 0 && c.col + c.col_span == cols)?;
    Some(Polygon::new(vec![ul, bl, br, ur]))
}

fn corner_of(cells: &[TableCell], slot: usize, pick: impl Fn(&TableCell) -> bool) -> Option<Point> {
    cells.iter().find(|c| pick(c)).and_then(|c| c.corner(slot))
}

/// Matches `template` against the detected lines, translating the template
/// by `offset` first.
pub fn match_template(
    template: &TableTemplate,
    horizontal: &[Line],
    vertical: &[Line],
    offset: Offset,
    config: &MatchConfig,
) -> Result<TableRegion> {
    TemplateMatcher::new(config.clone())
        .with_template(template.clone())
        .run(horizontal, vertical, offset)
}
