// plane geometry helpers shared by shapes, the matcher and candidate scoring
//
// everything works in f64: the key grid is 2^-20 of a unit, which f32 cannot
// hold at canvas-sized coordinates.

use serde::{Deserialize, Serialize};

/// quantization step for vertex coordinates. absorbs transform round-off
/// while staying far below anything visually distinct.
pub const EPS: f64 = 1.0 / (1u64 << 20) as f64;

/// height of an equilateral triangle with unit side (sqrt(3)/2)
pub const EQUI_TRIANGLE_H: f64 = 0.866025403784;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn snapped(self) -> Self {
        Self::new(snap(self.x), snap(self.y))
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// round a coordinate onto the EPS grid. negative zero comes back as zero
/// so that keys never print "-0".
#[inline]
pub fn snap(v: f64) -> f64 {
    (v / EPS).round() * EPS + 0.0
}

/// length of the edge between vertices `i0` and `i1`. zero when either index is missing.
pub fn edge_len(pts: &[Point], i0: usize, i1: usize) -> f64 {
    match (pts.get(i0), pts.get(i1)) {
        (Some(a), Some(b)) => (b.x - a.x).hypot(b.y - a.y),
        _ => 0.0,
    }
}

/// compute signed area of a polygon using the shoelace formula.
/// returns positive for CCW (y-up), negative for CW, zero for degenerate.
pub fn signed_area(pts: &[Point]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..pts.len() {
        let j = (i + 1) % pts.len();
        area += pts[i].x * pts[j].y;
        area -= pts[j].x * pts[i].y;
    }
    area * 0.5
}

/// absolute shoelace area
#[inline]
pub fn polygon_area(pts: &[Point]) -> f64 {
    signed_area(pts).abs()
}

/// area of the axis-aligned bounding box
pub fn bbox_area(pts: &[Point]) -> f64 {
    if pts.is_empty() {
        return 0.0;
    }
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in pts {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).max(0.0) * (max_y - min_y).max(0.0)
}

/// vertex average, used for painter's ordering
pub fn centroid(pts: &[Point]) -> Point {
    let n = pts.len().max(1) as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// point-in-polygon by ray casting (even-odd rule)
pub fn contains_point(pts: &[Point], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = pts.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (pts[i], pts[j]);
        // the straddle test guarantees pi.y != pj.y, so the division is safe
        if (pi.y > y) != (pj.y > y) && x < (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_signed_area_ccw() {
        let sq = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(signed_area(&sq) > 0.0);
    }

    #[test]
    fn test_signed_area_cw() {
        let sq = pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(signed_area(&sq) < 0.0);
        assert_eq!(polygon_area(&sq), 1.0);
    }

    #[test]
    fn test_degenerate_area_falls_back_to_bbox() {
        // collinear: zero shoelace area but a real bounding box height of zero too
        let line = pts(&[(0.0, 0.0), (2.0, 0.0), (4.0, 0.0)]);
        assert_eq!(polygon_area(&line), 0.0);
        assert_eq!(bbox_area(&line), 0.0);

        // bow-tie: signed halves cancel, bbox still reports 4
        let bow = pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert_eq!(signed_area(&bow), 0.0);
        assert_eq!(bbox_area(&bow), 4.0);
    }

    #[test]
    fn test_snap_grid_and_negative_zero() {
        assert_eq!(snap(64.0), 64.0);
        assert_eq!(snap(0.1 + 0.2), snap(0.3));
        let z = snap(-1e-12);
        assert_eq!(z, 0.0);
        assert!(z.is_sign_positive());
    }

    #[test]
    fn test_edge_len() {
        let tri = pts(&[(0.0, 0.0), (3.0, 4.0), (0.0, 4.0)]);
        assert_eq!(edge_len(&tri, 0, 1), 5.0);
        assert_eq!(edge_len(&tri, 0, 7), 0.0);
    }

    #[test]
    fn test_contains_point_even_odd() {
        let sq = pts(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        assert!(contains_point(&sq, 32.0, 32.0));
        assert!(!contains_point(&sq, 96.0, 32.0));
        assert!(!contains_point(&sq, -1.0, 10.0));
    }

    #[test]
    fn test_centroid() {
        let sq = pts(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        assert_eq!(centroid(&sq), Point::new(1.0, 1.0));
    }
}
