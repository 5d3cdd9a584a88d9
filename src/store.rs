use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::bounds::InBounds;
use crate::shape::{IdAllocator, PolyId, Polygon, Shape, ShapeKey};

/// all committed polygons, in painter's order, plus a canonical-key index.
///
/// append-only apart from `clear`. no two polygons ever share a key. polygons are
/// handed out as `Arc`s so candidates can hold on to matched pieces cheaply.
#[derive(Debug, Default)]
pub struct Store {
    polys: Vec<Arc<Polygon>>,
    by_key: HashMap<ShapeKey, Arc<Polygon>>,
    ids: IdAllocator,
}

/// painter's order: descending centroid y, then descending centroid x
fn paint_order(a: &Shape, b: &Shape) -> Ordering {
    let (ca, cb) = (a.centroid(), b.centroid());
    cb.y.total_cmp(&ca.y).then(cb.x.total_cmp(&ca.x))
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// commit a shape. returns the new id, or `None` when the shape is out of
    /// bounds or its key is already present.
    pub fn insert<B: InBounds + ?Sized>(&mut self, shape: Shape, bounds: &B) -> Option<PolyId> {
        profiling::scope!("Store::insert");
        if !bounds.admits(&shape) {
            return None;
        }
        let key = shape.key();
        if self.by_key.contains_key(&key) {
            return None;
        }

        let id = PolyId(self.ids.next_id());
        let poly = Arc::new(Polygon::new(id, shape));
        // stable among equals: new polygons go after existing ties
        let at = self
            .polys
            .partition_point(|p| paint_order(p.shape(), poly.shape()) != Ordering::Greater);
        self.polys.insert(at, Arc::clone(&poly));
        self.by_key.insert(key, poly);
        Some(id)
    }

    pub fn lookup(&self, key: &ShapeKey) -> Option<&Arc<Polygon>> {
        self.by_key.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &ShapeKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// drop every polygon. the id counter keeps running so ids are never reused.
    pub fn clear(&mut self) {
        self.polys.clear();
        self.by_key.clear();
    }

    /// read-only view in painter's order
    #[inline]
    pub fn all(&self) -> &[Arc<Polygon>] {
        &self.polys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// closest stored polygon with the same vertex count, comparing vertices index by index.
    /// only polygons whose summed squared error is below `max_sq_err` qualify.
    pub fn find_nearest(&self, target: &Shape, max_sq_err: f64) -> Option<&Arc<Polygon>> {
        let want = target.points();
        let mut best: Option<(&Arc<Polygon>, f64)> = None;
        for poly in &self.polys {
            let pts = poly.points();
            if pts.len() != want.len() {
                continue;
            }
            let err: f64 = pts
                .iter()
                .zip(want)
                .map(|(a, b)| (a.x - b.x).powi(2) + (a.y - b.y).powi(2))
                .sum();
            if err < max_sq_err && best.is_none_or(|(_, e)| err < e) {
                best = Some((poly, err));
            }
        }
        best.map(|(p, _)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::new([(x, y), (x, y + h), (x + w, y + h), (x + w, y)]).unwrap()
    }

    #[test]
    fn test_insert_rejects_duplicates_and_out_of_bounds() {
        let bounds = Bounds::canvas(256.0, 256.0);
        let mut store = Store::new();
        assert_eq!(store.insert(rect(0.0, 0.0, 64.0, 64.0), &bounds), Some(PolyId(1)));

        // same shape, different starting vertex
        let rotated = Shape::new([(64.0, 64.0), (64.0, 0.0), (0.0, 0.0), (0.0, 64.0)]).unwrap();
        assert_eq!(store.insert(rotated, &bounds), None);
        assert_eq!(store.insert(rect(250.0, 0.0, 64.0, 64.0), &bounds), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_by_key() {
        let mut store = Store::new();
        let sq = rect(10.0, 10.0, 5.0, 5.0);
        let key = sq.key();
        let id = store.insert(sq, &|_: &Shape| true).unwrap();
        assert_eq!(store.lookup(&key).map(|p| p.id()), Some(id));
        assert!(store.lookup(&rect(0.0, 0.0, 1.0, 1.0).key()).is_none());
    }

    #[test]
    fn test_painter_order_descending_y_then_x() {
        let all = |_: &Shape| true;
        let mut store = Store::new();
        store.insert(rect(0.0, 0.0, 10.0, 10.0), &all);
        store.insert(rect(0.0, 100.0, 10.0, 10.0), &all);
        store.insert(rect(50.0, 50.0, 10.0, 10.0), &all);
        store.insert(rect(80.0, 50.0, 10.0, 10.0), &all);

        let ys_xs: Vec<(f64, f64)> = store
            .all()
            .iter()
            .map(|p| {
                let c = p.shape().centroid();
                (c.y, c.x)
            })
            .collect();
        assert_eq!(ys_xs, vec![(105.0, 5.0), (55.0, 85.0), (55.0, 55.0), (5.0, 5.0)]);
    }

    #[test]
    fn test_clear_keeps_id_counter() {
        let all = |_: &Shape| true;
        let mut store = Store::new();
        store.insert(rect(0.0, 0.0, 1.0, 1.0), &all);
        store.insert(rect(5.0, 0.0, 1.0, 1.0), &all);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.insert(rect(0.0, 0.0, 1.0, 1.0), &all), Some(PolyId(3)));
    }

    #[test]
    fn test_find_nearest() {
        let all = |_: &Shape| true;
        let mut store = Store::new();
        let id = store.insert(rect(0.0, 0.0, 10.0, 10.0), &all).unwrap();
        store.insert(rect(40.0, 0.0, 10.0, 10.0), &all);

        let near = rect(0.5, 0.0, 10.0, 10.0);
        assert_eq!(store.find_nearest(&near, 4.0).map(|p| p.id()), Some(id));
        assert!(store.find_nearest(&rect(20.0, 0.0, 10.0, 10.0), 4.0).is_none());
    }
}
