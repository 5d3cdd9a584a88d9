use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::bounds::InBounds;
use crate::shape::{IdAllocator, Polygon, Shape, ShapeKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId(pub u64);

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// a rewrite rule: when every match shape is present (under some similarity
/// transform), the result shapes may be added. both templates live in the
/// rule's own coordinate frame.
#[derive(Clone, Debug)]
pub struct Production {
    id: ProductionId,
    match_template: Vec<Shape>,
    result_template: Vec<Shape>,
}

impl Production {
    pub fn new(id: ProductionId, match_template: Vec<Shape>, result_template: Vec<Shape>) -> Self {
        Self { id, match_template, result_template }
    }

    #[inline]
    pub fn id(&self) -> ProductionId {
        self.id
    }

    #[inline]
    pub fn match_template(&self) -> &[Shape] {
        &self.match_template
    }

    #[inline]
    pub fn result_template(&self) -> &[Shape] {
        &self.result_template
    }

    /// structural matching arity
    #[inline]
    pub fn count_required_polys(&self) -> usize {
        self.match_template.len()
    }

    /// offset that lines up the first template vertex with the first vertex of `pcomb[0]`
    fn anchor_offset(&self, pcomb: &[Arc<Polygon>]) -> Option<(f64, f64)> {
        let m0 = self.match_template.first()?;
        let p0 = pcomb.first()?;
        let (a, m) = (p0.shape().origin(), m0.origin());
        Some((a.x - m.x, a.y - m.y))
    }

    /// pure-translation check: moved by the offset implied by the first elements, does
    /// the match template cover exactly the key set of `pcomb`?
    pub fn is_matching(&self, pcomb: &[Arc<Polygon>]) -> bool {
        if self.match_template.is_empty() || pcomb.len() != self.match_template.len() {
            return false;
        }
        let Some((ax, ay)) = self.anchor_offset(pcomb) else {
            return false;
        };
        let wanted: HashSet<ShapeKey> = self.match_template.iter().map(|m| m.rel_key(1.0, ax, ay)).collect();
        let combo: HashSet<&ShapeKey> = pcomb.iter().map(|p| p.key()).collect();
        wanted.len() == combo.len() && combo.iter().all(|k| wanted.contains(*k))
    }

    /// result shapes this rule would add on top of `pcomb` at scale 1.
    ///
    /// results identical to a matched piece are kept pieces, not additions. one
    /// out-of-bounds result rejects the whole proposal. results the store already
    /// has (`has_key`) are dropped.
    pub fn preview<B, K>(&self, pcomb: &[Arc<Polygon>], bounds: &B, has_key: K) -> Vec<Shape>
    where
        B: InBounds + ?Sized,
        K: Fn(&ShapeKey) -> bool,
    {
        let Some((dx, dy)) = self.anchor_offset(pcomb) else {
            return Vec::new();
        };
        let matched: HashSet<&ShapeKey> = pcomb.iter().map(|p| p.key()).collect();

        let to_add: Vec<(ShapeKey, Shape)> = self
            .result_template
            .iter()
            .map(|r| r.translated(dx, dy))
            .map(|s| (s.key(), s))
            .filter(|(k, _)| !matched.contains(k))
            .collect();
        if to_add.iter().any(|(_, s)| !bounds.admits(s)) {
            return Vec::new();
        }
        to_add.into_iter().filter(|(k, _)| !has_key(k)).map(|(_, s)| s).collect()
    }
}

/// builds a production set, handing out production ids from its own counter
#[derive(Debug, Default)]
pub struct Grammar {
    ids: IdAllocator,
    productions: Vec<Arc<Production>>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, match_template: Vec<Shape>, result_template: Vec<Shape>) -> ProductionId {
        let id = ProductionId(self.ids.next_id());
        self.productions.push(Arc::new(Production::new(id, match_template, result_template)));
        id
    }

    pub fn productions(&self) -> &[Arc<Production>] {
        &self.productions
    }

    pub fn into_productions(self) -> Vec<Arc<Production>> {
        self.productions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;
    use crate::store::Store;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::new([(x, y), (x, y + h), (x + w, y + h), (x + w, y)]).unwrap()
    }

    fn stored(store: &mut Store, shape: Shape) -> Arc<Polygon> {
        let key = shape.key();
        store.insert(shape, &|_: &Shape| true).unwrap();
        Arc::clone(store.lookup(&key).unwrap())
    }

    #[test]
    fn test_grammar_assigns_increasing_ids() {
        let mut g = Grammar::new();
        let a = g.add(vec![rect(0.0, 0.0, 1.0, 1.0)], vec![]);
        let b = g.add(vec![rect(0.0, 0.0, 1.0, 1.0)], vec![]);
        assert!(b > a);
        assert_eq!(g.productions().len(), 2);
        assert_eq!(g.productions()[0].count_required_polys(), 1);
    }

    #[test]
    fn test_is_matching_translated_pair() {
        let mut store = Store::new();
        let a = stored(&mut store, rect(100.0, 100.0, 10.0, 10.0));
        let b = stored(&mut store, rect(110.0, 100.0, 10.0, 10.0));
        let prod = Production::new(
            ProductionId(1),
            vec![rect(0.0, 0.0, 10.0, 10.0), rect(10.0, 0.0, 10.0, 10.0)],
            vec![],
        );
        assert!(prod.is_matching(&[Arc::clone(&a), Arc::clone(&b)]));
        // wrong arity
        assert!(!prod.is_matching(&[Arc::clone(&a)]));
        // second piece in the wrong place
        let c = stored(&mut store, rect(100.0, 120.0, 10.0, 10.0));
        assert!(!prod.is_matching(&[a, c]));
    }

    #[test]
    fn test_is_matching_rejects_collapsed_template() {
        let mut store = Store::new();
        let a = stored(&mut store, rect(0.0, 0.0, 10.0, 10.0));
        let b = stored(&mut store, rect(10.0, 0.0, 10.0, 10.0));
        // template lists the same shape twice: the key set has one element
        let prod = Production::new(
            ProductionId(1),
            vec![rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 0.0, 10.0, 10.0)],
            vec![],
        );
        assert!(!prod.is_matching(&[a, b]));
    }

    #[test]
    fn test_empty_template_never_matches() {
        let mut store = Store::new();
        let a = stored(&mut store, rect(0.0, 0.0, 10.0, 10.0));
        let prod = Production::new(ProductionId(1), vec![], vec![rect(0.0, 0.0, 1.0, 1.0)]);
        assert!(!prod.is_matching(&[Arc::clone(&a)]));
        assert!(prod.preview(&[a], &|_: &Shape| true, |_| false).is_empty());
    }

    #[test]
    fn test_preview_filters_kept_pieces_bounds_and_existing() {
        let bounds = Bounds::canvas(200.0, 200.0);
        let mut store = Store::new();
        let a = stored(&mut store, rect(50.0, 50.0, 10.0, 10.0));
        let prod = Production::new(
            ProductionId(1),
            vec![rect(0.0, 0.0, 10.0, 10.0)],
            vec![
                rect(0.0, 0.0, 10.0, 10.0),  // the matched piece itself: kept, not added
                rect(10.0, 0.0, 10.0, 10.0), // new neighbour
            ],
        );
        let out = prod.preview(&[Arc::clone(&a)], &bounds, |k| store.contains_key(k));
        assert_eq!(out, vec![rect(60.0, 50.0, 10.0, 10.0)]);

        // neighbour already present: nothing left to add
        stored(&mut store, rect(60.0, 50.0, 10.0, 10.0));
        assert!(prod.preview(&[Arc::clone(&a)], &bounds, |k| store.contains_key(k)).is_empty());

        // any result out of bounds rejects everything
        let tight = Bounds::canvas(65.0, 65.0);
        assert!(prod.preview(&[a], &tight, |_| false).is_empty());
    }
}
