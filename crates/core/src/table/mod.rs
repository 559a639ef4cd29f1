//! Table structure matching.
//!
//! The pipeline runs in four stages:
//! 1. [`builder`] links template cells to their neighbours.
//! 2. [`graph`] searches line candidates for every unshared border and
//!    connects mutually consistent matches.
//! 3. [`clique`] selects the largest consistent match set per orientation.
//! 4. [`reconstruct`] turns the selection into cell polygons, synthesizing
//!    borders without a match.

pub mod builder;
pub mod candidates;
pub mod clique;
pub mod graph;
pub mod params;
pub mod reconstruct;
pub mod region;
pub mod types;

pub use builder::build_raw_table;
pub use candidates::{LineCandidateFinder, search_radius};
pub use clique::maximum_clique;
pub use graph::{
    AssociationGraph, AssociationGraphNode, connect, is_adjacent, merge_colinear, reduce_nodes,
};
pub use params::MatchConfig;
pub use reconstruct::{Reconstruction, TableReconstructor};
pub use region::{BorderSource, MatchStats, TableCell, TableRegion};
pub use types::{
    BorderPosition, LineCandidate, LineCandidates, RawCell, TableTemplate, TemplateCell,
};

use crate::error::{MatchError, Result};

impl TableTemplate {
    /// Checks grid size and cell placement.
    pub fn validate(&self) -> Result<()> {
        if self.cells.is_empty() {
            return Err(MatchError::EmptyTemplate);
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(MatchError::InvalidTemplate(format!(
                "grid must have rows and columns, got {}x{}",
                self.rows, self.cols
            )));
        }
        let mut seen = rustc_hash::FxHashSet::default();
        for cell in &self.cells {
            if cell.row_span == 0 || cell.col_span == 0 {
                return Err(MatchError::InvalidTemplate(format!(
                    "cell {} has a zero span",
                    cell.id
                )));
            }
            if cell.row + cell.row_span > self.rows || cell.col + cell.col_span > self.cols {
                return Err(MatchError::InvalidTemplate(format!(
                    "cell {} at ({}, {}) exceeds the {}x{} grid",
                    cell.id, cell.row, cell.col, self.rows, self.cols
                )));
            }
            if cell.polygon.is_empty() {
                return Err(MatchError::InvalidTemplate(format!(
                    "cell {} has no polygon",
                    cell.id
                )));
            }
            if !seen.insert((cell.row, cell.col)) {
                return Err(MatchError::InvalidTemplate(format!(
                    "two cells start at ({}, {})",
                    cell.row, cell.col
                )));
            }
        }
        Ok(())
    }
}
