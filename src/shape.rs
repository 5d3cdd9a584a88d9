use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GrowError, Result};
use crate::geom::{self, snap, Point};

/// display attributes. the engine carries them through transforms but never reads them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Option<[f32; 4]>, // un-premultiplied, 0..1
    pub fill: Option<[f32; 4]>,
}

impl Default for Style {
    fn default() -> Self {
        Self { stroke: Some([0.0, 0.0, 0.0, 1.0]), fill: None }
    }
}

/// canonical identity of a shape's geometry and position: snapped vertices,
/// rotated to start at the minimal (y, then x) vertex, joined as `x,y|x,y|...`.
/// winding direction is part of the key, so a mirror image is a different shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey(String);

impl ShapeKey {
    fn from_snapped(pts: &[Point]) -> Self {
        let start = min_vertex_index(pts);
        let mut out = String::with_capacity(pts.len() * 16);
        for (n, p) in pts[start..].iter().chain(&pts[..start]).enumerate() {
            if n > 0 {
                out.push('|');
            }
            out.push_str(&format!("{},{}", p.x, p.y));
        }
        ShapeKey(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// index of the vertex with minimal y, ties broken by minimal x. first occurrence wins.
fn min_vertex_index(pts: &[Point]) -> usize {
    let mut min = 0;
    for (i, a) in pts.iter().enumerate().skip(1) {
        let b = pts[min];
        if a.y < b.y || (a.y == b.y && a.x < b.x) {
            min = i;
        }
    }
    min
}

/// polygon geometry with no identity: templates, proposals, and the payload of stored polygons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawShape")]
pub struct Shape {
    points: Vec<Point>,
    pub style: Style,
}

// unchecked wire form; deserialization goes through `Shape::new`
#[derive(Deserialize)]
struct RawShape {
    points: Vec<Point>,
    #[serde(default)]
    style: Style,
}

impl TryFrom<RawShape> for Shape {
    type Error = GrowError;

    fn try_from(raw: RawShape) -> Result<Self> {
        Ok(Shape::new(raw.points)?.with_style(raw.style))
    }
}

impl Shape {
    /// build a shape from at least 3 finite points
    pub fn new<P: Into<Point>>(points: impl IntoIterator<Item = P>) -> Result<Self> {
        let points: Vec<Point> = points.into_iter().map(Into::into).collect();
        if points.len() < 3 {
            return Err(GrowError::TooFewPoints { got: points.len() });
        }
        if let Some(index) = points.iter().position(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(GrowError::NonFinitePoint { index });
        }
        Ok(Self { points, style: Style::default() })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// first vertex. shapes always have at least 3 points.
    #[inline]
    pub fn origin(&self) -> Point {
        self.points[0]
    }

    pub fn key(&self) -> ShapeKey {
        let snapped: Vec<Point> = self.points.iter().map(|p| p.snapped()).collect();
        ShapeKey::from_snapped(&snapped)
    }

    /// key of this shape under `p * scale + (dx, dy)`, without building the shape
    pub fn rel_key(&self, scale: f64, dx: f64, dy: f64) -> ShapeKey {
        let moved: Vec<Point> = self
            .points
            .iter()
            .map(|p| Point::new(snap(p.x * scale + dx), snap(p.y * scale + dy)))
            .collect();
        ShapeKey::from_snapped(&moved)
    }

    /// copy mapped by `p * scale + (dx, dy)`, every coordinate snapped to the key grid
    pub fn transformed(&self, scale: f64, dx: f64, dy: f64) -> Shape {
        let points = self
            .points
            .iter()
            .map(|p| Point::new(snap(p.x * scale + dx), snap(p.y * scale + dy)))
            .collect();
        Shape { points, style: self.style }
    }

    /// plain translated copy (no snapping)
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        let points = self.points.iter().map(|p| Point::new(p.x + dx, p.y + dy)).collect();
        Shape { points, style: self.style }
    }

    /// length of the first edge, the reference for deriving scale
    #[inline]
    pub fn reference_edge(&self) -> f64 {
        geom::edge_len(&self.points, 0, 1)
    }

    pub fn centroid(&self) -> Point {
        geom::centroid(&self.points)
    }

    pub fn area(&self) -> f64 {
        geom::polygon_area(&self.points)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        geom::contains_point(&self.points, x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolyId(pub u64);

impl fmt::Display for PolyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// monotonically increasing id source. owned by whoever creates the identities,
/// ids are never handed out twice.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// a shape committed to a store. immutable once created; the key is computed once.
#[derive(Debug)]
pub struct Polygon {
    id: PolyId,
    key: ShapeKey,
    shape: Shape,
}

impl Polygon {
    pub(crate) fn new(id: PolyId, shape: Shape) -> Self {
        let key = shape.key();
        Self { id, key, shape }
    }

    #[inline]
    pub fn id(&self) -> PolyId {
        self.id
    }

    #[inline]
    pub fn key(&self) -> &ShapeKey {
        &self.key
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        self.shape.points()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Shape {
        Shape::new([(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_json_goes_through_validation() {
        let empty = serde_json::from_str::<Shape>(r#"{"points":[]}"#);
        assert!(empty.unwrap_err().to_string().contains("at least 3 points"));
        let two = serde_json::from_str::<Shape>(r#"{"points":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}]}"#);
        assert!(two.is_err());

        let json = serde_json::to_string(&square()).unwrap();
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square());
        assert_eq!(back.style, Style::default());
    }

    #[test]
    fn test_key_format() {
        assert_eq!(square().key().as_str(), "0,0|0,64|64,64|64,0");
    }

    #[test]
    fn test_key_invariant_under_rotation() {
        let raw = [(3.5, 1.0), (10.0, 2.0), (7.25, 9.0), (1.0, 6.0), (0.0, 3.0)];
        let base = Shape::new(raw).unwrap().key();
        for r in 1..raw.len() {
            let mut rotated = raw.to_vec();
            rotated.rotate_left(r);
            assert_eq!(Shape::new(rotated).unwrap().key(), base, "rotation {r}");
        }
    }

    #[test]
    fn test_key_distinguishes_mirror_image() {
        // same vertex set, reversed winding: deliberately a different shape
        let cw = square();
        let ccw = Shape::new([(0.0, 0.0), (64.0, 0.0), (64.0, 64.0), (0.0, 64.0)]).unwrap();
        assert_ne!(cw.key(), ccw.key());
    }

    #[test]
    fn test_key_absorbs_float_drift() {
        let drifted = Shape::new([(1e-9, 0.0), (0.0, 64.0 - 1e-9), (64.0, 64.0), (64.0, 0.0)]).unwrap();
        assert_eq!(drifted.key(), square().key());
    }

    #[test]
    fn test_rel_key_matches_transformed_and_leaves_source() {
        let sq = square();
        let moved = sq.transformed(0.5, 10.0, -4.0);
        assert_eq!(sq.rel_key(0.5, 10.0, -4.0), moved.key());
        assert_eq!(moved.points()[2], Point::new(42.0, 28.0));
        assert_eq!(sq.points()[2], Point::new(64.0, 64.0));
    }

    #[test]
    fn test_degenerate_shape_still_has_key() {
        let dot = Shape::new([(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]).unwrap();
        assert_eq!(dot.key().as_str(), "5,5|5,5|5,5");
        assert_eq!(dot.reference_edge(), 0.0);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(matches!(
            Shape::new([(0.0, 0.0), (1.0, 1.0)]),
            Err(GrowError::TooFewPoints { got: 2 })
        ));
        assert!(matches!(
            Shape::new([(0.0, 0.0), (1.0, f64::NAN), (2.0, 0.0)]),
            Err(GrowError::NonFinitePoint { index: 1 })
        ));
    }

    #[test]
    fn test_id_allocator_is_monotonic() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }
}
