//! Robust line fitting over point samples of detected segments.

use super::{EPSILON, Line, Point};

/// Spacing of the samples taken along a segment.
const SAMPLE_STEP: f64 = 5.0;
/// Upper bound of the samples taken along one segment.
const MAX_SAMPLES: usize = 512;
const MAX_ITERATIONS: usize = 10;
/// Tuning constant of the Cauchy weight function.
const CAUCHY_C: f64 = 2.385;
/// Lower bound of the residual scale, in pixels.
const MIN_SCALE: f64 = 0.5;

/// Fits a single line to a point set.
///
/// `fit_line_lms` gives a least-median-of-squares estimate over all pairs of
/// anchor points, `fit_line` refines it with iteratively reweighted total
/// least squares over every sample.
#[derive(Clone, Debug)]
pub struct LineFitting {
    pts: Vec<Point>,
    anchors: Vec<Point>,
    min_length: f64,
    eps: f64,
}

impl LineFitting {
    pub fn new(pts: Vec<Point>) -> Self {
        Self {
            anchors: pts.clone(),
            pts,
            min_length: 2.0,
            eps: 0.1,
        }
    }

    /// Samples every segment uniformly so longer segments carry more weight.
    /// Segment endpoints are the LMS anchors.
    pub fn from_lines(lines: &[Line]) -> Self {
        let mut pts = Vec::new();
        let mut anchors = Vec::with_capacity(lines.len() * 2);
        for line in lines {
            anchors.push(line.p1());
            anchors.push(line.p2());
            let steps = (line.length() / SAMPLE_STEP)
                .ceil()
                .max(1.0)
                .min(MAX_SAMPLES as f64) as usize;
            let v = line.vector();
            for i in 0..=steps {
                pts.push(line.p1() + v * (i as f64 / steps as f64));
            }
        }
        Self {
            pts,
            anchors,
            min_length: 2.0,
            eps: 0.1,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.pts
    }

    pub fn fit_line_lms(&self) -> Option<Line> {
        let mut best: Option<Line> = None;
        let mut min_lms = f64::MAX;
        'outer: for (i, a) in self.anchors.iter().enumerate() {
            for b in &self.anchors[i + 1..] {
                let line = Line::new(*a, *b);
                if line.length() < self.min_length {
                    continue;
                }
                let squared: Vec<f64> = self
                    .pts
                    .iter()
                    .map(|p| {
                        let d = line.distance(*p);
                        d * d
                    })
                    .collect();
                let mr = median(squared);
                if mr < min_lms {
                    min_lms = mr;
                    best = Some(line);
                }
                if min_lms < self.eps {
                    break 'outer;
                }
            }
        }
        best
    }

    pub fn fit_line(&self) -> Option<Line> {
        if self.pts.len() < 2 {
            return None;
        }
        let mut weights = match self.fit_line_lms() {
            Some(init) => cauchy_weights(&self.pts, &init),
            None => vec![1.0; self.pts.len()],
        };
        let (mut center, mut dir) = weighted_tls(&self.pts, &weights)?;
        for _ in 0..MAX_ITERATIONS {
            weights = cauchy_weights(&self.pts, &Line::new(center, center + dir));
            let (next_center, next_dir) = weighted_tls(&self.pts, &weights)?;
            let turned = 1.0 - next_dir.dot(dir).abs();
            let moved = next_center.distance(center);
            center = next_center;
            dir = next_dir;
            if turned < 1e-9 && moved < 1e-6 {
                break;
            }
        }

        let (t_min, t_max) = self
            .pts
            .iter()
            .map(|p| dir.dot(*p - center))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            });
        Some(Line::new(center + dir * t_min, center + dir * t_max))
    }
}

fn cauchy_weights(pts: &[Point], line: &Line) -> Vec<f64> {
    let residuals: Vec<f64> = pts.iter().map(|p| line.distance(*p)).collect();
    let scale = (1.4826 * median(residuals.clone())).max(MIN_SCALE) * CAUCHY_C;
    residuals
        .into_iter()
        .map(|r| 1.0 / (1.0 + (r / scale).powi(2)))
        .collect()
}

/// Weighted total least squares: returns the weighted centroid and the
/// unit direction of the principal axis.
fn weighted_tls(pts: &[Point], weights: &[f64]) -> Option<(Point, Point)> {
    let sw: f64 = weights.iter().sum();
    if sw < EPSILON {
        return None;
    }
    let mut c = Point::default();
    for (p, w) in pts.iter().zip(weights) {
        c = c + *p * *w;
    }
    c = c * (1.0 / sw);

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (p, w) in pts.iter().zip(weights) {
        let d = *p - c;
        sxx += w * d.x * d.x;
        syy += w * d.y * d.y;
        sxy += w * d.x * d.y;
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    Some((c, Point::new(theta.cos(), theta.sin())))
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) * 0.5
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(Vec::new()), 0.0);
    }

    #[test]
    fn sample_count_is_bounded_per_segment() {
        let fitting = LineFitting::from_lines(&[
            Line::from_coords(0.0, 0.0, 1e12, 0.0),
            Line::from_coords(0.0, 5.0, 1e12, 5.0),
        ]);
        assert_eq!(fitting.points().len(), 2 * (MAX_SAMPLES + 1));
        let fit = fitting.fit_line().unwrap();
        assert!(fit.is_horizontal(0.1));
    }

    #[test]
    fn fits_two_colinear_fragments() {
        let fit = LineFitting::from_lines(&[
            Line::from_coords(0.0, 10.0, 40.0, 10.0),
            Line::from_coords(60.0, 10.0, 100.0, 10.0),
        ])
        .fit_line()
        .unwrap();
        assert!(fit.is_horizontal(0.1));
        assert!((fit.center().y - 10.0).abs() < 1e-6);
        assert!((fit.length() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn outlier_fragment_has_little_influence() {
        let fit = LineFitting::from_lines(&[
            Line::from_coords(50.0, 0.0, 50.0, 200.0),
            Line::from_coords(50.0, 220.0, 50.0, 400.0),
            Line::from_coords(58.0, 100.0, 58.0, 110.0),
        ])
        .fit_line()
        .unwrap();
        assert!(fit.is_vertical(0.5));
        assert!((fit.center().x - 50.0).abs() < 0.5);
    }

    #[test]
    fn lms_needs_two_distinct_anchors() {
        assert!(LineFitting::new(vec![Point::new(1.0, 1.0)]).fit_line_lms().is_none());
        assert!(LineFitting::new(vec![Point::new(1.0, 1.0)]).fit_line().is_none());
    }
}
