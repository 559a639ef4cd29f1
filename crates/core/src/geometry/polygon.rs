use super::Point;

/// Axis-aligned bounding box in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// A closed polygon given by its vertices.
///
/// Cell polygons use the corner order upper-left, bottom-left,
/// bottom-right, upper-right.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_bbox(b: BBox) -> Self {
        Self::new(vec![
            Point::new(b.x0, b.top),
            Point::new(b.x0, b.bottom),
            Point::new(b.x1, b.bottom),
            Point::new(b.x1, b.top),
        ])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn translated(&self, v: Point) -> Polygon {
        Polygon::new(self.points.iter().map(|p| *p + v).collect())
    }

    pub fn bbox(&self) -> Option<BBox> {
        let first = self.points.first()?;
        let mut b = BBox {
            x0: first.x,
            top: first.y,
            x1: first.x,
            bottom: first.y,
        };
        for p in &self.points[1..] {
            b.x0 = b.x0.min(p.x);
            b.x1 = b.x1.max(p.x);
            b.top = b.top.min(p.y);
            b.bottom = b.bottom.max(p.y);
        }
        Some(b)
    }

    /// Corner quadrilateral (UL, BL, BR, UR).
    ///
    /// Four-point polygons are taken as given, anything else falls back
    /// to its bounding box.
    pub fn corners(&self) -> Option<[Point; 4]> {
        if let [ul, bl, br, ur] = self.points.as_slice() {
            return Some([*ul, *bl, *br, *ur]);
        }
        let b = self.bbox()?;
        Some([
            Point::new(b.x0, b.top),
            Point::new(b.x0, b.bottom),
            Point::new(b.x1, b.bottom),
            Point::new(b.x1, b.top),
        ])
    }
}
