use std::sync::Arc;

use crate::geom::{self, Point};
use crate::production::Production;
use crate::shape::{PolyId, Polygon, Shape};

/// uniform scale followed by translation (no rotation, no reflection)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Similarity {
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Similarity {
    pub const IDENTITY: Similarity = Similarity { scale: 1.0, dx: 0.0, dy: 0.0 };

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.dx, p.y * self.scale + self.dy)
    }
}

/// one concrete way a production can fire against the store it was computed from.
/// only valid until the store changes.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub production: Arc<Production>,
    /// matched store polygons, in match-template order
    pub pcomb: Vec<Arc<Polygon>>,
    /// proposed new shapes, not yet in any store
    pub to_add: Vec<Shape>,
    pub transform: Similarity,
}

impl Candidate {
    pub fn matched_ids(&self) -> Vec<PolyId> {
        self.pcomb.iter().map(|p| p.id()).collect()
    }

    /// total area of the proposed shapes. degenerate shapes (zero shoelace area)
    /// count with their bounding-box area instead.
    pub fn score(&self) -> f64 {
        self.to_add
            .iter()
            .map(|s| {
                let a = s.area();
                if a > 0.0 {
                    a
                } else {
                    geom::bbox_area(s.points())
                }
            })
            .sum()
    }

    /// does any proposed shape contain the point (even-odd)?
    pub fn covers(&self, x: f64, y: f64) -> bool {
        self.to_add.iter().any(|s| s.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::production::ProductionId;

    fn candidate(to_add: Vec<Shape>) -> Candidate {
        Candidate {
            production: Arc::new(Production::new(ProductionId(1), vec![], vec![])),
            pcomb: vec![],
            to_add,
            transform: Similarity::IDENTITY,
        }
    }

    #[test]
    fn test_score_sums_areas() {
        let c = candidate(vec![
            Shape::new([(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]).unwrap(),
            Shape::new([(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]).unwrap(),
        ]);
        assert_eq!(c.score(), 18.0);
    }

    #[test]
    fn test_score_falls_back_to_bbox_for_zero_area() {
        // self-cancelling bow-tie in a 2x2 box
        let c = candidate(vec![Shape::new([(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]).unwrap()]);
        assert_eq!(c.score(), 4.0);
    }

    #[test]
    fn test_covers() {
        let c = candidate(vec![Shape::new([(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]).unwrap()]);
        assert!(c.covers(1.0, 1.0));
        assert!(!c.covers(5.0, 1.0));
    }

    #[test]
    fn test_similarity_apply() {
        let t = Similarity { scale: 0.5, dx: 3.0, dy: -1.0 };
        assert_eq!(t.apply(Point::new(4.0, 4.0)), Point::new(5.0, 1.0));
    }
}
