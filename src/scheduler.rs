use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::bounds::Bounds;
use crate::engine::{find_applicable_productions, Candidate, Sampling, SearchOptions, DEFAULT_CANDIDATE_LIMIT};
use crate::geom::Point;
use crate::production::{Production, ProductionId};
use crate::select::{candidate_under_point, uniform_choice, weighted_choice};
use crate::shape::{PolyId, Shape};
use crate::store::Store;

/// how auto mode picks the next candidate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthPolicy {
    /// full search, pick proportionally to added area. slow but fair to big shapes.
    #[default]
    Weighted,
    /// full search stopped at the first hit. packs space, no randomness.
    First,
    /// sample `count` productions and anchors, pick uniformly among the hits. fast, uneven.
    Stochastic { count: usize },
}

impl GrowthPolicy {
    fn search_options(self, limit: Option<usize>) -> SearchOptions {
        match self {
            GrowthPolicy::Weighted => SearchOptions { sampling: Sampling::Exhaustive, limit: None },
            GrowthPolicy::First => SearchOptions { sampling: Sampling::Exhaustive, limit: Some(1) },
            GrowthPolicy::Stochastic { count } => SearchOptions { sampling: Sampling::Stochastic { count }, limit },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// what a committed candidate did to the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyReport {
    pub production: ProductionId,
    pub matched: Vec<PolyId>,
    /// ids of the shapes that were actually inserted; stale proposals are skipped
    pub added: Vec<PolyId>,
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Applied {} to ", self.production)?;
        for (i, id) in self.matched.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// not running, nothing happened
    Idle,
    /// no candidates left; auto mode has stopped itself
    Exhausted,
    Applied(ApplyReport),
}

/// Owns the store and the production set, and drives growth either one manual
/// pick at a time or through ticks while running.
///
/// Every mutation goes through `&mut self`, so there is exactly one mutator.
pub struct Scheduler {
    store: Store,
    productions: Vec<Arc<Production>>,
    bounds: Bounds,
    rng: Pcg32,
    state: RunState,
    policy: GrowthPolicy,
    candidate_limit: Option<usize>,
    candidates: Vec<Candidate>,
    show_previews: bool,
    ticks: u64,
}

impl Scheduler {
    pub fn new(bounds: Bounds, productions: Vec<Arc<Production>>, seed: u64) -> Self {
        Self {
            store: Store::new(),
            productions,
            bounds,
            rng: Pcg32::seed_from_u64(seed),
            state: RunState::Idle,
            policy: GrowthPolicy::default(),
            candidate_limit: Some(DEFAULT_CANDIDATE_LIMIT),
            candidates: Vec::new(),
            show_previews: true,
            ticks: 0,
        }
    }

    /// soft cap used by preview searches and by the stochastic policy
    pub fn with_candidate_limit(mut self, limit: Option<usize>) -> Self {
        self.candidate_limit = limit;
        self
    }

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[inline]
    pub fn productions(&self) -> &[Arc<Production>] {
        &self.productions
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[inline]
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// number of candidates applied by ticks since creation
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// candidates to draw as previews. empty while previews are hidden.
    pub fn previews(&self) -> &[Candidate] {
        if self.show_previews {
            &self.candidates
        } else {
            &[]
        }
    }

    pub fn set_show_previews(&mut self, show: bool) {
        self.show_previews = show;
        if show {
            self.refresh_candidates();
        }
    }

    /// insert a seed shape under the scheduler's bounds
    pub fn seed(&mut self, shape: Shape) -> Option<PolyId> {
        self.store.insert(shape, &self.bounds)
    }

    /// recompute the interactive candidate list against the current store
    pub fn refresh_candidates(&mut self) -> &[Candidate] {
        let options = SearchOptions { sampling: Sampling::Exhaustive, limit: self.candidate_limit };
        self.candidates =
            find_applicable_productions(&self.store, &self.productions, &self.bounds, options, &mut self.rng);
        &self.candidates
    }

    /// Idle -> Running. returns false (and changes nothing) when already running.
    pub fn start(&mut self, policy: GrowthPolicy) -> bool {
        if self.is_running() {
            return false;
        }
        self.policy = policy;
        self.state = RunState::Running;
        self.show_previews = false;
        self.candidates.clear();
        info!(?policy, polygons = self.store.len(), "auto growth started");
        true
    }

    /// Running -> Idle. leaves the store alone and drops pending previews.
    pub fn stop(&mut self) {
        if self.is_running() {
            info!(polygons = self.store.len(), ticks = self.ticks, "auto growth stopped");
        }
        self.state = RunState::Idle;
        self.candidates.clear();
    }

    /// one scheduled step: search, pick per policy, commit
    pub fn tick(&mut self) -> TickOutcome {
        profiling::scope!("Scheduler::tick");
        if !self.is_running() {
            return TickOutcome::Idle;
        }

        let options = self.policy.search_options(self.candidate_limit);
        let found = find_applicable_productions(&self.store, &self.productions, &self.bounds, options, &mut self.rng);
        let choice = match self.policy {
            GrowthPolicy::Weighted => weighted_choice(&found, &mut self.rng),
            GrowthPolicy::First => found.first(),
            GrowthPolicy::Stochastic { .. } => uniform_choice(&found, &mut self.rng),
        };
        let Some(choice) = choice else {
            self.state = RunState::Idle;
            self.candidates.clear();
            info!(polygons = self.store.len(), ticks = self.ticks, "growth exhausted");
            return TickOutcome::Exhausted;
        };

        let report = self.commit(choice);
        self.ticks += 1;
        TickOutcome::Applied(report)
    }

    /// Manual pick: apply the first fresh candidate with a proposed shape under `point`.
    /// ignored while auto mode is running.
    pub fn apply_at(&mut self, point: Point) -> Option<ApplyReport> {
        if self.is_running() {
            return None;
        }
        self.refresh_candidates();
        let hit = candidate_under_point(&self.candidates, point)?.clone();
        let report = self.commit(&hit);
        self.refresh_candidates();
        Some(report)
    }

    /// swap the rule set. stops auto mode and recomputes candidates.
    pub fn set_productions(&mut self, productions: Vec<Arc<Production>>) {
        self.stop();
        self.productions = productions;
        self.refresh_candidates();
    }

    /// stop and empty the store. the id counter is not reset.
    pub fn reset(&mut self) {
        self.stop();
        self.store.clear();
    }

    /// insert every proposed shape, re-checking bounds and duplicates one by one.
    /// a candidate from an older snapshot may already be partly applied; those shapes are skipped.
    fn commit(&mut self, cand: &Candidate) -> ApplyReport {
        let added: Vec<PolyId> = cand
            .to_add
            .iter()
            .filter_map(|s| self.store.insert(s.clone(), &self.bounds))
            .collect();
        let report = ApplyReport { production: cand.production.id(), matched: cand.matched_ids(), added };
        debug!(added = report.added.len(), polygons = self.store.len(), "{report}");
        report
    }
}
