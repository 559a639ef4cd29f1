//! Line candidate search and search radius.

use tablematch_core::geometry::{BBox, Line, Orientation, Polygon};
use tablematch_core::table::{
    BorderPosition, LineCandidateFinder, TemplateCell, build_raw_table, search_radius,
};

#[test]
fn test_finds_close_overlapping_lines() {
    let lines = [
        Line::from_coords(0.0, 102.0, 200.0, 102.0),
        Line::from_coords(0.0, 160.0, 200.0, 160.0),
        Line::from_coords(300.0, 100.0, 400.0, 100.0),
        Line::from_coords(0.0, 95.0, 20.0, 95.0),
    ];
    let finder = LineCandidateFinder::new(&lines, Orientation::Horizontal);
    let found = finder.find(Line::from_coords(0.0, 100.0, 100.0, 100.0), 30.0);

    // far line, disjoint line and short fragment are rejected
    assert_eq!(found.candidate_indices(), vec![0]);
    assert_eq!(found.overlaps(), vec![100.0]);
    assert_eq!(found.distances(), vec![2.0]);
}

#[test]
fn test_reference_direction_does_not_matter() {
    let lines = [Line::from_coords(49.0, 0.0, 51.0, 300.0)];
    let finder = LineCandidateFinder::new(&lines, Orientation::Vertical);
    let down = finder.find(Line::from_coords(50.0, 0.0, 50.0, 100.0), 30.0);
    let up = finder.find(Line::from_coords(50.0, 100.0, 50.0, 0.0), 30.0);
    assert_eq!(down.candidate_indices(), up.candidate_indices());
    assert_eq!(down.overlaps(), up.overlaps());
}

#[test]
fn test_overlap_ratio_is_strict() {
    let lines = [Line::from_coords(0.0, 0.0, 30.0, 0.0)];
    let reference = Line::from_coords(0.0, 0.0, 100.0, 0.0);

    let finder = LineCandidateFinder::new(&lines, Orientation::Horizontal);
    assert!(finder.find(reference, 10.0).is_empty());

    let relaxed = finder.with_min_overlap_ratio(0.25);
    assert_eq!(relaxed.find(reference, 10.0).len(), 1);
}

#[test]
fn test_distance_equal_to_radius_is_rejected() {
    let lines = [Line::from_coords(0.0, 30.0, 100.0, 30.0)];
    let finder = LineCandidateFinder::new(&lines, Orientation::Horizontal);
    assert!(finder.find(Line::from_coords(0.0, 0.0, 100.0, 0.0), 30.0).is_empty());
    assert_eq!(finder.find(Line::from_coords(0.0, 0.0, 100.0, 0.0), 30.5).len(), 1);
}

#[test]
fn test_candidates_rank_by_overlap_and_distance() {
    let lines = [
        Line::from_coords(0.0, 5.0, 60.0, 5.0),
        Line::from_coords(0.0, 1.0, 40.0, 1.0),
        Line::from_coords(0.0, 9.0, 100.0, 9.0),
    ];
    let finder = LineCandidateFinder::new(&lines, Orientation::Horizontal);
    let found = finder.find(Line::from_coords(0.0, 0.0, 100.0, 0.0), 20.0);
    assert_eq!(found.sort_by_overlap(), vec![2, 0, 1]);
    assert_eq!(found.sort_by_distance(), vec![1, 0, 2]);
}

fn cell(row: usize, col: usize, w: f64, h: f64, x: f64, y: f64) -> TemplateCell {
    let b = BBox {
        x0: x,
        top: y,
        x1: x + w,
        bottom: y + h,
    };
    TemplateCell::new(format!("{row}{col}"), row, col, Polygon::from_bbox(b))
}

#[test]
fn test_search_radius_uses_smallest_cell_on_either_side() {
    // narrow and wide cell side by side, a short row below
    let template = vec![
        cell(0, 0, 200.0, 80.0, 0.0, 0.0),
        cell(0, 1, 60.0, 80.0, 200.0, 0.0),
        cell(1, 0, 200.0, 20.0, 0.0, 80.0),
        cell(1, 1, 60.0, 20.0, 200.0, 80.0),
    ];
    let cells = build_raw_table(&template);

    assert_eq!(search_radius(&cells, 0, BorderPosition::Right, 30.0), 60.0);
    // the narrow cell bounds the shared border from both sides
    assert_eq!(search_radius(&cells, 1, BorderPosition::Left, 30.0), 60.0);
    // the row below is shorter than the floor
    assert_eq!(search_radius(&cells, 0, BorderPosition::Bottom, 30.0), 30.0);
    // outer borders fall back to the floor
    assert_eq!(search_radius(&cells, 0, BorderPosition::Top, 30.0), 30.0);
    assert_eq!(search_radius(&cells, 1, BorderPosition::Right, 30.0), 30.0);
}

#[test]
fn test_narrow_cell_does_not_reach_its_opposite_gridline() {
    let template = vec![
        cell(0, 0, 40.0, 100.0, 0.0, 0.0),
        cell(0, 1, 200.0, 100.0, 40.0, 0.0),
    ];
    let cells = build_raw_table(&template);
    assert_eq!(search_radius(&cells, 0, BorderPosition::Right, 30.0), 40.0);

    // only the outer gridlines were detected
    let lines = [
        Line::from_coords(0.0, 0.0, 0.0, 100.0),
        Line::from_coords(240.0, 0.0, 240.0, 100.0),
    ];
    let finder = LineCandidateFinder::new(&lines, Orientation::Vertical);
    let radius = search_radius(&cells, 0, BorderPosition::Right, 30.0);
    let found = finder.find(cells[0].border_line(BorderPosition::Right), radius);
    assert!(found.is_empty());
}
