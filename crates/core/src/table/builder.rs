//! Raw table construction: links template cells to their neighbours.

use tracing::debug;

use super::types::{BorderPosition, RawCell, TemplateCell};

/// Builds the linked cell list from template cells.
///
/// Cells are sorted by (row, col) first. A cell `b` is the right neighbour of
/// `a` when `b` starts at the column where `a` ends and their row ranges
/// overlap; bottom neighbours follow the same rule on rows. Every relation is
/// recorded on both cells. Cells on the table edge keep empty lists.
pub fn build_raw_table(template_cells: &[TemplateCell]) -> Vec<RawCell> {
    let mut sorted: Vec<&TemplateCell> = template_cells.iter().collect();
    sorted.sort_by_key(|c| (c.row, c.col));

    let mut cells: Vec<RawCell> = sorted.into_iter().map(RawCell::from_template).collect();

    let mut links = 0usize;
    for i in 0..cells.len() {
        for j in 0..cells.len() {
            if i == j {
                continue;
            }
            let (a, b) = (&cells[j], &cells[i]);
            let left = a.last_col() == b.col && a.rows_overlap(b);
            let top = a.last_row() == b.row && a.cols_overlap(b);
            if left {
                cells[i].add_neighbor(BorderPosition::Left, j);
                cells[j].add_neighbor(BorderPosition::Right, i);
                links += 1;
            }
            if top {
                cells[i].add_neighbor(BorderPosition::Top, j);
                cells[j].add_neighbor(BorderPosition::Bottom, i);
                links += 1;
            }
        }
    }

    debug!(cells = cells.len(), links, "raw table built");
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BBox, Polygon};

    fn cell(row: usize, col: usize) -> TemplateCell {
        let b = BBox {
            x0: col as f64 * 10.0,
            top: row as f64 * 10.0,
            x1: col as f64 * 10.0 + 10.0,
            bottom: row as f64 * 10.0 + 10.0,
        };
        TemplateCell::new(format!("{row}-{col}"), row, col, Polygon::from_bbox(b))
    }

    #[test]
    fn sorts_cells_before_linking() {
        let cells = build_raw_table(&[cell(1, 0), cell(0, 1), cell(0, 0)]);
        let ids: Vec<&str> = cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0-0", "0-1", "1-0"]);
        assert_eq!(cells[0].neighbors(BorderPosition::Right), &[1]);
        assert_eq!(cells[0].neighbors(BorderPosition::Bottom), &[2]);
        assert!(cells[2].neighbors(BorderPosition::Right).is_empty());
    }

    #[test]
    fn edge_cells_have_no_outer_neighbours() {
        let cells = build_raw_table(&[cell(0, 0)]);
        for p in BorderPosition::ALL {
            assert!(!cells[0].has_neighbor(p));
        }
    }
}
