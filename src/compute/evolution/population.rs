//! Population store: every evaluated candidate plus the active
//! (non-dominated) subset.
//!
//! Entries are keyed by a unique [`CandidateId`], so two different candidates
//! with identical scores are both kept. The active set is a list of ids into
//! the history; it grows on insert and only shrinks during [`Population::reduce`].

use std::collections::{BTreeMap, HashSet};

use log::debug;
use rand::Rng;
use rand::rngs::StdRng;

use crate::schema::{CandidateId, FilterReport, HistoryRetention, PopulationEntry, ScoreVector};

use super::dominance::non_dominated;
use super::error::{DominanceError, EvaluationError, EvolutionError};
use super::objective::ObjectiveRegistry;

/// Evaluated candidates and the current Pareto front.
#[derive(Debug)]
pub struct Population<C> {
    /// Retained history, oldest first.
    entries: BTreeMap<CandidateId, PopulationEntry<C>>,
    /// Active set, in insertion order. Every id is present in `entries`.
    active: Vec<CandidateId>,
    /// Lowest-penalty entry ever inserted. Never evicted.
    best: Option<CandidateId>,
    next_id: u64,
    evicted: u64,
    retention: HistoryRetention,
}

impl<C> Default for Population<C> {
    fn default() -> Self {
        Self::new(HistoryRetention::Unbounded)
    }
}

impl<C> Population<C> {
    /// Create an empty population.
    pub fn new(retention: HistoryRetention) -> Self {
        Self {
            entries: BTreeMap::new(),
            active: Vec::new(),
            best: None,
            next_id: 0,
            evicted: 0,
            retention,
        }
    }

    /// Evaluate and insert the initial candidate.
    pub fn seed(
        &mut self,
        objectives: &mut ObjectiveRegistry<C>,
        candidate: C,
    ) -> Result<CandidateId, EvolutionError> {
        if self.is_seeded() {
            return Err(EvolutionError::AlreadySeeded);
        }
        if objectives.is_empty() {
            return Err(EvolutionError::NoObjectives);
        }
        Ok(self.insert(objectives, candidate, 0)?)
    }

    /// Evaluate `candidate` and store it in both the history and the active set.
    ///
    /// Closes the objective registry. On evaluation failure nothing is stored.
    pub fn insert(
        &mut self,
        objectives: &mut ObjectiveRegistry<C>,
        candidate: C,
        generation: u64,
    ) -> Result<CandidateId, EvaluationError> {
        let scores = objectives.evaluate_all(&candidate)?;
        objectives.close();
        Ok(self.insert_scored(candidate, scores, generation))
    }

    fn insert_scored(&mut self, candidate: C, scores: ScoreVector, generation: u64) -> CandidateId {
        let id = CandidateId(self.next_id);
        self.next_id += 1;

        let penalty = scores.penalty();
        let improves = self
            .best_by_penalty()
            .is_none_or(|best| penalty < best.penalty);

        self.entries.insert(
            id,
            PopulationEntry {
                id,
                scores,
                candidate,
                penalty,
                generation,
            },
        );
        self.active.push(id);
        if improves {
            self.best = Some(id);
        }

        self.enforce_retention();
        id
    }

    /// True once any candidate has been inserted.
    pub fn is_seeded(&self) -> bool {
        self.next_id > 0
    }

    /// Number of retained history entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the active set.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Candidates ever inserted, including evicted ones.
    pub fn total_inserted(&self) -> u64 {
        self.next_id
    }

    /// History entries dropped by the retention policy.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn get(&self, id: CandidateId) -> Option<&PopulationEntry<C>> {
        self.entries.get(&id)
    }

    /// Retained history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &PopulationEntry<C>> {
        self.entries.values()
    }

    /// Active set members, in insertion order.
    pub fn active(&self) -> impl Iterator<Item = &PopulationEntry<C>> {
        self.active.iter().filter_map(|id| self.entries.get(id))
    }

    /// Entry with the lowest penalty across the whole history.
    ///
    /// A reporting heuristic only: the result need not be Pareto optimal.
    pub fn best_by_penalty(&self) -> Option<&PopulationEntry<C>> {
        self.best.and_then(|id| self.entries.get(&id))
    }

    /// Shrink the active set to its non-dominated members.
    pub fn reduce(&mut self) -> Result<FilterReport, DominanceError> {
        let before = self.active.len();
        self.active = {
            let members: Vec<(CandidateId, &ScoreVector)> = self
                .active
                .iter()
                .filter_map(|id| self.entries.get(id).map(|e| (*id, &e.scores)))
                .collect();
            non_dominated(&members)?
        };
        self.enforce_retention();

        let report = FilterReport {
            before,
            after: self.active.len(),
        };
        debug!(
            "Dominance filter: {} -> {} active candidates",
            report.before, report.after
        );
        Ok(report)
    }

    fn enforce_retention(&mut self) {
        let HistoryRetention::KeepLatest { capacity } = self.retention else {
            return;
        };
        if self.entries.len() <= capacity {
            return;
        }

        let excess = self.entries.len() - capacity;
        let protected: HashSet<CandidateId> =
            self.active.iter().copied().chain(self.best).collect();
        let victims: Vec<CandidateId> = self
            .entries
            .keys()
            .copied()
            .filter(|id| !protected.contains(id))
            .take(excess)
            .collect();

        for id in &victims {
            self.entries.remove(id);
        }
        self.evicted += victims.len() as u64;
    }
}

impl<C: Clone> Population<C> {
    /// Draw `k` independent copies uniformly, with replacement, from the active set.
    ///
    /// Returns an empty vector when the active set is empty.
    pub fn sample(&self, k: usize, rng: &mut StdRng) -> Vec<C> {
        if self.active.is_empty() {
            return Vec::new();
        }
        (0..k)
            .filter_map(|_| {
                let id = self.active[rng.gen_range(0..self.active.len())];
                self.entries.get(&id).map(|e| e.candidate.clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Direction;
    use rand::SeedableRng;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
        tag: Vec<u8>,
    }

    fn point(x: f64, y: f64) -> Point {
        Point { x, y, tag: vec![0] }
    }

    fn objectives() -> ObjectiveRegistry<Point> {
        let mut objectives = ObjectiveRegistry::new();
        objectives
            .register("x", Direction::Minimize, |p: &Point| Ok(p.x))
            .unwrap();
        objectives
            .register("y", Direction::Minimize, |p: &Point| Ok(p.y))
            .unwrap();
        objectives
    }

    #[test]
    fn test_seed_invariant() {
        let mut objectives = objectives();
        let mut population = Population::default();
        let seed = point(5.0, 3.0);
        population.seed(&mut objectives, seed.clone()).unwrap();

        let active: Vec<_> = population.active().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].candidate, seed);
        assert_eq!(active[0].penalty, 8.0);
        assert!(objectives.is_closed());
    }

    #[test]
    fn test_seed_twice() {
        let mut objectives = objectives();
        let mut population = Population::default();
        population.seed(&mut objectives, point(1.0, 1.0)).unwrap();
        assert!(matches!(
            population.seed(&mut objectives, point(1.0, 1.0)),
            Err(EvolutionError::AlreadySeeded)
        ));
    }

    #[test]
    fn test_seed_without_objectives() {
        let mut objectives = ObjectiveRegistry::new();
        let mut population = Population::default();
        assert!(matches!(
            population.seed(&mut objectives, point(1.0, 1.0)),
            Err(EvolutionError::NoObjectives)
        ));
    }

    #[test]
    fn test_failed_evaluation_not_inserted() {
        let mut objectives = objectives();
        objectives
            .register("fails", Direction::Minimize, |p: &Point| {
                if p.x < 0.0 {
                    Err("negative".into())
                } else {
                    Ok(0.0)
                }
            })
            .unwrap();
        let mut population = Population::default();
        population.seed(&mut objectives, point(1.0, 1.0)).unwrap();
        assert!(population.insert(&mut objectives, point(-1.0, 1.0), 1).is_err());
        assert_eq!(population.len(), 1);
        assert_eq!(population.active_len(), 1);
        assert_eq!(population.total_inserted(), 1);
    }

    #[test]
    fn test_identical_scores_do_not_collide() {
        let mut objectives = objectives();
        let mut population = Population::default();
        population.seed(&mut objectives, point(1.0, 1.0)).unwrap();
        let mut twin = point(1.0, 1.0);
        twin.tag = vec![9];
        population.insert(&mut objectives, twin, 1).unwrap();

        assert_eq!(population.len(), 2);
        population.reduce().unwrap();
        assert_eq!(population.active_len(), 2);
    }

    #[test]
    fn test_sample_empty() {
        let population: Population<Point> = Population::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(population.sample(3, &mut rng).is_empty());
    }

    #[test]
    fn test_sample_returns_independent_copies() {
        let mut objectives = objectives();
        let mut population = Population::default();
        population.seed(&mut objectives, point(1.0, 1.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let mut samples = population.sample(3, &mut rng);
        assert_eq!(samples.len(), 3);
        for sample in &mut samples {
            sample.tag.push(42);
            sample.x = 100.0;
        }
        let stored = population.active().next().unwrap();
        assert_eq!(stored.candidate, point(1.0, 1.0));
    }

    #[test]
    fn test_reduce_evicts_dominated() {
        let mut objectives = objectives();
        let mut population = Population::default();
        population.seed(&mut objectives, point(2.0, 2.0)).unwrap();
        population.insert(&mut objectives, point(1.0, 3.0), 1).unwrap();
        population.insert(&mut objectives, point(1.0, 1.0), 2).unwrap();

        let report = population.reduce().unwrap();
        assert_eq!(report, FilterReport { before: 3, after: 1 });
        assert_eq!(report.removed(), 2);
        assert_eq!(population.active().next().unwrap().candidate, point(1.0, 1.0));
        // History keeps everything.
        assert_eq!(population.len(), 3);

        let again = population.reduce().unwrap();
        assert_eq!(again, FilterReport { before: 1, after: 1 });
    }

    #[test]
    fn test_best_by_penalty() {
        let mut objectives = objectives();
        let mut population = Population::default();
        assert!(population.best_by_penalty().is_none());
        population.seed(&mut objectives, point(3.0, 3.0)).unwrap();
        population.insert(&mut objectives, point(0.0, 5.0), 1).unwrap();
        population.insert(&mut objectives, point(1.0, 1.0), 2).unwrap();
        population.insert(&mut objectives, point(4.0, 4.0), 3).unwrap();

        let best = population.best_by_penalty().unwrap();
        assert_eq!(best.candidate, point(1.0, 1.0));
        assert_eq!(best.generation, 2);
    }

    #[test]
    fn test_retention_keeps_active_and_best() {
        let mut objectives = objectives();
        let mut population = Population::new(HistoryRetention::KeepLatest { capacity: 2 });
        population.seed(&mut objectives, point(10.0, 10.0)).unwrap();
        for i in 1..=5 {
            let v = 10.0 - i as f64;
            population.insert(&mut objectives, point(v, v), i).unwrap();
            population.reduce().unwrap();
        }

        // Only the latest point is active and it is also the best.
        assert_eq!(population.active_len(), 1);
        assert!(population.len() <= 2);
        assert_eq!(population.total_inserted(), 6);
        assert_eq!(population.evicted() as usize + population.len(), 6);
        assert_eq!(population.best_by_penalty().unwrap().candidate, point(5.0, 5.0));
    }
}
