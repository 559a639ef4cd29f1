//! Line segments with stroke thickness.

use std::f64::consts::{FRAC_PI_2, PI};

use super::{EPSILON, Orientation, Point};

/// A line segment between two endpoints with a stroke width.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    p1: Point,
    p2: Point,
    #[cfg_attr(feature = "serde", serde(default = "default_thickness"))]
    thickness: f64,
}

#[cfg(feature = "serde")]
fn default_thickness() -> f64 {
    1.0
}

impl Default for Line {
    fn default() -> Self {
        Self {
            p1: Point::default(),
            p2: Point::default(),
            thickness: 1.0,
        }
    }
}

impl Line {
    pub fn new(p1: Point, p2: Point) -> Self {
        Self {
            p1,
            p2,
            thickness: 1.0,
        }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn with_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn p1(&self) -> Point {
        self.p1
    }

    pub fn p2(&self) -> Point {
        self.p2
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = thickness;
    }

    /// True for zero-length segments.
    pub fn is_empty(&self) -> bool {
        self.squared_length() < EPSILON
    }

    pub fn vector(&self) -> Point {
        self.p2 - self.p1
    }

    pub fn squared_length(&self) -> f64 {
        let v = self.vector();
        v.dot(v)
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Angle in radians in `[-pi, pi]`.
    pub fn angle(&self) -> f64 {
        let v = self.vector();
        v.y.atan2(v.x)
    }

    pub fn center(&self) -> Point {
        Point::new((self.p1.x + self.p2.x) * 0.5, (self.p1.y + self.p2.y) * 0.5)
    }

    /// Orders the endpoints left-to-right (horizontal) or top-to-bottom.
    pub fn sort_endpoints(&mut self, horizontal: bool) {
        let swap = if horizontal {
            self.p1.x > self.p2.x
        } else {
            self.p1.y > self.p2.y
        };
        if swap {
            std::mem::swap(&mut self.p1, &mut self.p2);
        }
    }

    pub fn sorted(mut self, orientation: Orientation) -> Self {
        self.sort_endpoints(orientation.is_horizontal());
        self
    }

    pub fn translated(&self, v: Point) -> Line {
        Line {
            p1: self.p1 + v,
            p2: self.p2 + v,
            thickness: self.thickness,
        }
    }

    /// Perpendicular distance of `p` to the infinite line through this segment.
    ///
    /// Degenerates to the point distance for zero-length segments.
    pub fn distance(&self, p: Point) -> f64 {
        let len = self.length();
        if len < EPSILON {
            return self.p1.distance(p);
        }
        let n = self.vector().normal();
        (n.dot(p - self.p2) / len).abs()
    }

    /// Length of the intersection of both x-projections, 0 if disjoint.
    pub fn horizontal_overlap(&self, other: &Line) -> f64 {
        interval_overlap((self.p1.x, self.p2.x), (other.p1.x, other.p2.x))
    }

    /// Length of the intersection of both y-projections, 0 if disjoint.
    pub fn vertical_overlap(&self, other: &Line) -> f64 {
        interval_overlap((self.p1.y, self.p2.y), (other.p1.y, other.p2.y))
    }

    pub fn overlap(&self, other: &Line, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.horizontal_overlap(other),
            Orientation::Vertical => self.vertical_overlap(other),
        }
    }

    /// Smallest distance between any endpoint of `self` and any endpoint of `other`.
    pub fn min_distance(&self, other: &Line) -> f64 {
        endpoint_distances(self, other)
            .into_iter()
            .fold(f64::INFINITY, f64::min)
    }

    /// Both centers lie within `threshold` of the other line.
    pub fn is_colinear(&self, other: &Line, threshold: f64) -> bool {
        self.distance(other.center()) < threshold && other.distance(self.center()) < threshold
    }

    /// The two segments have endpoints closer than `threshold`.
    pub fn is_close(&self, other: &Line, threshold: f64) -> bool {
        self.min_distance(other) < threshold
    }

    /// Line spanned by the two farthest endpoints.
    pub fn merge(&self, other: &Line) -> Line {
        let dists = endpoint_distances(self, other);
        let mut best = 0;
        for (idx, d) in dists.iter().enumerate() {
            if *d > dists[best] {
                best = idx;
            }
        }
        self.endpoint_pair(other, best)
    }

    /// Line spanned by the two nearest endpoints, i.e. the gap between both segments.
    pub fn gap_line(&self, other: &Line) -> Line {
        let dists = endpoint_distances(self, other);
        let mut best = 0;
        for (idx, d) in dists.iter().enumerate() {
            if *d < dists[best] {
                best = idx;
            }
        }
        self.endpoint_pair(other, best)
    }

    fn endpoint_pair(&self, other: &Line, idx: usize) -> Line {
        let (a, b) = match idx {
            0 => (self.p1, other.p1),
            1 => (self.p1, other.p2),
            2 => (self.p2, other.p1),
            _ => (self.p2, other.p2),
        };
        Line {
            p1: a,
            p2: b,
            thickness: self.thickness.min(other.thickness),
        }
    }

    /// Unsigned angle between both lines in `[0, pi/2]`.
    pub fn diff_angle(&self, other: &Line) -> f64 {
        let d = (self.angle() - other.angle()).rem_euclid(PI);
        d.min(PI - d)
    }

    /// True if the projection of `p` falls strictly inside the segment.
    pub fn within(&self, p: Point) -> bool {
        let v = self.vector();
        v.dot(p - self.p2) * v.dot(p - self.p1) < 0.0
    }

    pub fn is_horizontal(&self, angle_threshold_deg: f64) -> bool {
        let a = self.angle().rem_euclid(PI);
        a.min(PI - a) <= angle_threshold_deg.to_radians()
    }

    pub fn is_vertical(&self, angle_threshold_deg: f64) -> bool {
        let a = self.angle().rem_euclid(PI);
        (a - FRAC_PI_2).abs() <= angle_threshold_deg.to_radians()
    }

    /// Intersection of the two infinite lines, `None` if they are parallel
    /// or either segment is degenerate.
    pub fn intersection_unrestricted(&self, other: &Line) -> Option<Point> {
        let r = self.vector();
        let s = other.vector();
        let denom = r.x * s.y - r.y * s.x;
        if denom.abs() < EPSILON {
            return None;
        }
        let qp = other.p1 - self.p1;
        let t = (qp.x * s.y - qp.y * s.x) / denom;
        let p = self.p1 + r * t;
        p.is_finite().then_some(p)
    }
}

fn interval_overlap(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (a0, a1) = (a.0.min(a.1), a.0.max(a.1));
    let (b0, b1) = (b.0.min(b.1), b.0.max(b.1));
    (a1.min(b1) - a0.max(b0)).max(0.0)
}

fn endpoint_distances(a: &Line, b: &Line) -> [f64; 4] {
    [
        a.p1.distance(b.p1),
        a.p1.distance(b.p2),
        a.p2.distance(b.p1),
        a.p2.distance(b.p2),
    ]
}

/// Splits an unsorted line list into horizontal and vertical lines.
///
/// Lines deviating more than `angle_threshold_deg` from both axes are dropped.
pub fn split_by_orientation(lines: &[Line], angle_threshold_deg: f64) -> (Vec<Line>, Vec<Line>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for line in lines {
        if line.is_horizontal(angle_threshold_deg) {
            horizontal.push(line.sorted(Orientation::Horizontal));
        } else if line.is_vertical(angle_threshold_deg) {
            vertical.push(line.sorted(Orientation::Vertical));
        }
    }
    (horizontal, vertical)
}
