use rand::Rng;
use rayon::prelude::*;

use crate::engine::Candidate;
use crate::geom::Point;

/// Pick a candidate with probability proportional to its area score.
///
/// Falls back to a uniform pick when every score is zero. `None` only for an empty slice.
pub fn weighted_choice<'a, R: Rng + ?Sized>(cands: &'a [Candidate], rng: &mut R) -> Option<&'a Candidate> {
    profiling::scope!("weighted_choice");
    if cands.is_empty() {
        return None;
    }
    let weights: Vec<f64> = cands.par_iter().map(Candidate::score).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return uniform_choice(cands, rng);
    }

    let mut r = rng.random::<f64>() * total;
    for (c, w) in cands.iter().zip(&weights) {
        r -= w;
        if r <= 0.0 {
            return Some(c);
        }
    }
    cands.last()
}

pub fn uniform_choice<'a, R: Rng + ?Sized>(cands: &'a [Candidate], rng: &mut R) -> Option<&'a Candidate> {
    if cands.is_empty() {
        return None;
    }
    Some(&cands[rng.random_range(0..cands.len())])
}

/// first candidate with a proposed shape under `point` (world coordinates)
pub fn candidate_under_point(cands: &[Candidate], point: Point) -> Option<&Candidate> {
    cands.iter().find(|c| c.covers(point.x, point.y))
}
