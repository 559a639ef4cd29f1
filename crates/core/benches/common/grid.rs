use tablematch_core::geometry::{BBox, Line, Polygon};
use tablematch_core::{TableTemplate, TemplateCell};

use crate::rng::XorShift64;

pub struct NoisyGrid {
    pub template: TableTemplate,
    pub horizontal: Vec<Line>,
    pub vertical: Vec<Line>,
}

/// Regular template plus detected lines that are jittered, scaled, broken
/// into fragments, partly missing and mixed with short clutter.
pub fn noisy_grid(rng: &mut XorShift64, rows: usize, cols: usize) -> NoisyGrid {
    let (w, h) = (120.0, 40.0);
    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let b = BBox {
                x0: c as f64 * w,
                top: r as f64 * h,
                x1: (c + 1) as f64 * w,
                bottom: (r + 1) as f64 * h,
            };
            cells.push(TemplateCell::new(format!("{r}:{c}"), r, c, Polygon::from_bbox(b)));
        }
    }
    let template = TableTemplate {
        rows,
        cols,
        polygon: Polygon::from_bbox(BBox {
            x0: 0.0,
            top: 0.0,
            x1: cols as f64 * w,
            bottom: rows as f64 * h,
        }),
        cells,
    };

    let scale = rng.gen_f64(0.95, 1.08);
    let (width, height) = (cols as f64 * w * scale, rows as f64 * h * scale);
    let mut horizontal = Vec::new();
    for r in 0..=rows {
        let y = r as f64 * h * scale + rng.gen_f64(-2.0, 2.0);
        push_fragments(rng, &mut horizontal, width, |a, b| {
            Line::from_coords(a, y, b, y + tilt(a, b))
        });
    }
    let mut vertical = Vec::new();
    for c in 0..=cols {
        let x = c as f64 * w * scale + rng.gen_f64(-2.0, 2.0);
        push_fragments(rng, &mut vertical, height, |a, b| Line::from_coords(x, a, x, b));
    }
    for _ in 0..(rows * cols / 4) {
        let x = rng.gen_f64(0.0, width);
        let y = rng.gen_f64(0.0, height);
        horizontal.push(Line::from_coords(x, y, x + rng.gen_f64(10.0, 60.0), y));
    }

    NoisyGrid {
        template,
        horizontal,
        vertical,
    }
}

fn tilt(a: f64, b: f64) -> f64 {
    (b - a) * 0.002
}

fn push_fragments(
    rng: &mut XorShift64,
    out: &mut Vec<Line>,
    length: f64,
    make: impl Fn(f64, f64) -> Line,
) {
    if rng.chance(0.05) {
        return;
    }
    let mut start = 0.0;
    while start < length {
        let end = (start + rng.gen_f64(80.0, 400.0)).min(length);
        out.push(make(start, end).with_thickness(rng.gen_f64(1.0, 3.0)));
        start = end + rng.gen_f64(2.0, 8.0);
    }
}
