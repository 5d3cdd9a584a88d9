// Matching engine
// Finds every place a production can fire against the current store.

pub mod candidate;
pub mod combinations;
pub mod enumerate;

pub use candidate::{Candidate, Similarity};
pub use combinations::{combinations, Combinations};
pub use enumerate::find_by_enumeration;

use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

use crate::bounds::InBounds;
use crate::geom::snap;
use crate::production::Production;
use crate::shape::{Polygon, Shape};
use crate::store::Store;

/// soft cap on candidates per search, protecting interactive latency
pub const DEFAULT_CANDIDATE_LIMIT: usize = 500;

/// most (production, anchor) pairs a single stochastic search will try
pub const MAX_STOCHASTIC_PAIRS: usize = 1 << 16;

/// which (production, anchor) pairs a search visits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sampling {
    /// full cross product, productions outer, anchors in store order
    Exhaustive,
    /// `count` random productions zipped with `count` random anchors
    Stochastic { count: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub sampling: Sampling,
    /// stop once this many candidates are collected. results under a limit are not complete.
    pub limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { sampling: Sampling::Exhaustive, limit: Some(DEFAULT_CANDIDATE_LIMIT) }
    }
}

impl SearchOptions {
    pub fn unbounded() -> Self {
        Self { sampling: Sampling::Exhaustive, limit: None }
    }
}

/// Search the store for applicable productions.
///
/// For each visited (production, anchor) pair the anchor's first edge fixes the
/// uniform scale and its first vertex fixes the translation; the whole match
/// template must then be present in the store's key index. Degenerate geometry
/// (zero-length reference edges, non-finite or non-positive scale) skips the pair.
/// Candidates that would add nothing new, or would leave `bounds`, are dropped.
pub fn find_applicable_productions<B, R>(
    store: &Store,
    productions: &[Arc<Production>],
    bounds: &B,
    options: SearchOptions,
    rng: &mut R,
) -> Vec<Candidate>
where
    B: InBounds + ?Sized,
    R: Rng + ?Sized,
{
    profiling::scope!("find_applicable_productions");
    let mut out = Vec::new();
    if store.is_empty() || productions.is_empty() || options.limit == Some(0) {
        return out;
    }
    let full = |out: &Vec<Candidate>| options.limit.is_some_and(|l| out.len() >= l);

    match options.sampling {
        Sampling::Exhaustive => {
            for prod in productions {
                let Some(template_edge) = reference_edge(prod) else {
                    continue;
                };
                for anchor in store.all() {
                    if let Some(c) = try_anchor(store, prod, template_edge, anchor, bounds) {
                        out.push(c);
                        if full(&out) {
                            return out;
                        }
                    }
                }
            }
        }
        Sampling::Stochastic { count } => {
            let count = count.min(MAX_STOCHASTIC_PAIRS);
            let mut prod_picks = SampleCycled::new(productions.len());
            let mut anchor_picks = SampleCycled::new(store.len());
            // paired positionally, not crossed
            for drawn in 0..count {
                let left = count - drawn;
                let (Some(pi), Some(ai)) = (prod_picks.draw(rng, left), anchor_picks.draw(rng, left)) else {
                    break;
                };
                let prod = &productions[pi];
                let Some(template_edge) = reference_edge(prod) else {
                    continue;
                };
                if let Some(c) = try_anchor(store, prod, template_edge, &store.all()[ai], bounds) {
                    out.push(c);
                    if full(&out) {
                        return out;
                    }
                }
            }
        }
    }

    tracing::trace!(candidates = out.len(), polygons = store.len(), "search finished");
    out
}

/// first-edge length of the production's first match shape, `None` when the
/// production cannot fire at all (empty or degenerate template)
fn reference_edge(prod: &Production) -> Option<f64> {
    let edge = prod.match_template().first()?.reference_edge();
    (edge > 0.0).then_some(edge)
}

fn try_anchor<B>(
    store: &Store,
    prod: &Arc<Production>,
    template_edge: f64,
    anchor: &Arc<Polygon>,
    bounds: &B,
) -> Option<Candidate>
where
    B: InBounds + ?Sized,
{
    profiling::scope!("try_anchor");
    let anchor_edge = anchor.shape().reference_edge();
    if anchor_edge == 0.0 {
        return None;
    }
    let scale = anchor_edge / template_edge;
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    let m0 = prod.match_template()[0].origin();
    let a0 = anchor.shape().origin();
    let t = Similarity {
        scale,
        dx: snap(a0.x - m0.x * scale),
        dy: snap(a0.y - m0.y * scale),
    };

    // every match shape must already be there; partial matches do not count
    let pcomb = prod
        .match_template()
        .iter()
        .map(|m| store.lookup(&m.rel_key(t.scale, t.dx, t.dy)).cloned())
        .collect::<Option<Vec<_>>>()?;

    let matched: HashSet<_> = pcomb.iter().map(|p| p.key()).collect();
    let mut to_add: Vec<Shape> = prod
        .result_template()
        .iter()
        .map(|r| r.transformed(t.scale, t.dx, t.dy))
        .filter(|s| !matched.contains(&s.key()))
        .collect();
    if to_add.iter().any(|s| !bounds.admits(s)) {
        return None;
    }
    to_add.retain(|s| !store.contains_key(&s.key()));
    if to_add.is_empty() {
        return None;
    }

    Some(Candidate { production: Arc::clone(prod), pcomb, to_add, transform: t })
}

/// Endless stream of indices into `0..len`. Each pass over the population draws
/// without replacement and the next pass is reshuffled only once reached, so a
/// consumer that stops early never pays for draws it does not use.
struct SampleCycled {
    len: usize,
    pass: std::vec::IntoIter<usize>,
}

impl SampleCycled {
    fn new(len: usize) -> Self {
        Self { len, pass: Vec::new().into_iter() }
    }

    /// next index; `wanted` bounds how much of a fresh pass gets drawn.
    /// `None` only for an empty population.
    fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R, wanted: usize) -> Option<usize> {
        if self.len == 0 || wanted == 0 {
            return None;
        }
        if self.pass.len() == 0 {
            self.pass = index::sample(rng, self.len, wanted.min(self.len)).into_vec().into_iter();
        }
        self.pass.next()
    }
}
