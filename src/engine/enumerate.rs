use std::sync::Arc;

use super::candidate::{Candidate, Similarity};
use super::combinations::combinations;
use crate::bounds::InBounds;
use crate::production::Production;
use crate::shape::Polygon;
use crate::store::Store;

/// Brute-force search at scale 1: every `count_required_polys`-subset of the store,
/// tried with each member as the anchor, checked with `Production::is_matching`
/// and expanded with `Production::preview`.
///
/// Exponential in template size. Kept as an independent check on
/// `find_applicable_productions`, which it agrees with whenever anchors and
/// templates have the same size.
pub fn find_by_enumeration<B>(store: &Store, productions: &[Arc<Production>], bounds: &B) -> Vec<Candidate>
where
    B: InBounds + ?Sized,
{
    profiling::scope!("find_by_enumeration");
    let mut out = Vec::new();
    for prod in productions {
        let n = prod.count_required_polys();
        if n == 0 {
            continue;
        }
        for subset in combinations(store.all(), n) {
            for first in 0..subset.len() {
                let mut pcomb: Vec<Arc<Polygon>> = Vec::with_capacity(n);
                pcomb.push(Arc::clone(subset[first]));
                pcomb.extend(
                    subset
                        .iter()
                        .enumerate()
                        .filter(|&(i, _)| i != first)
                        .map(|(_, p)| Arc::clone(p)),
                );
                if !prod.is_matching(&pcomb) {
                    continue;
                }
                let to_add = prod.preview(&pcomb, bounds, |k| store.contains_key(k));
                if to_add.is_empty() {
                    continue;
                }

                let m0 = prod.match_template()[0].origin();
                let a0 = pcomb[0].shape().origin();
                let transform = Similarity { scale: 1.0, dx: a0.x - m0.x, dy: a0.y - m0.y };
                let Some(pcomb) = template_order(prod, &pcomb, transform) else {
                    continue;
                };
                out.push(Candidate { production: Arc::clone(prod), pcomb, to_add, transform });
            }
        }
    }
    out
}

/// reorder matched polygons to follow the match template
fn template_order(prod: &Production, pcomb: &[Arc<Polygon>], t: Similarity) -> Option<Vec<Arc<Polygon>>> {
    prod.match_template()
        .iter()
        .map(|m| {
            let key = m.rel_key(t.scale, t.dx, t.dy);
            pcomb.iter().find(|p| *p.key() == key).cloned()
        })
        .collect()
}
