//! Evolution controller: agent-driven steps, periodic dominance filtering and
//! a time-boxed, cancellable run loop.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::schema::{
    CandidateId, Direction, EngineConfig, FilterReport, RunConfig, RunState, RunSummary,
    ScoreVector, StatusSnapshot, StopReason,
};

use super::agent::AgentRegistry;
use super::error::{BoxError, DominanceError, EvaluationError, EvolutionError, RegistryError};
use super::objective::ObjectiveRegistry;
use super::population::Population;
use super::profiler::Profiler;

/// Profiler section charged with objective evaluation.
pub const EVALUATE_SECTION: &str = "evaluate";
/// Profiler section charged with dominance filtering.
pub const FILTER_SECTION: &str = "filter";

/// What a single step did.
#[derive(Debug)]
pub enum StepOutcome {
    /// The agent's result was evaluated and stored.
    Inserted(CandidateId),
    /// The sample was too small for the chosen agent; nothing happened.
    Skipped,
    /// An objective failed on the agent's result, which was discarded.
    Rejected(EvaluationError),
}

#[derive(Debug, Default)]
struct RunCounters {
    insertions: u64,
    skipped: u64,
    failures: u64,
    filter_passes: u64,
    last_failure: Option<String>,
}

/// Multi-objective evolution engine over candidates of type `C`.
///
/// Register objectives, then agents, seed one candidate and run. The engine is
/// single-writer: [`Engine::run`] steps on the calling thread, and
/// [`Engine::start`] moves the engine to a background thread and returns an
/// [`EvolutionHandle`](super::EvolutionHandle).
pub struct Engine<C> {
    config: EngineConfig,
    objectives: ObjectiveRegistry<C>,
    agents: AgentRegistry<C>,
    population: Population<C>,
    rng: StdRng,
    profiler: Profiler,
    generation: u64,
    state: RunState,
    elapsed: Duration,
    recent: VecDeque<ScoreVector>,
    counters: RunCounters,
    cancelled: Arc<AtomicBool>,
}

impl<C> Default for Engine<C> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<C> Engine<C> {
    /// Create an empty engine.
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.random_seed.unwrap_or_else(rand::random);
        let population = Population::new(config.retention);

        Self {
            config,
            objectives: ObjectiveRegistry::new(),
            agents: AgentRegistry::new(),
            population,
            rng: StdRng::seed_from_u64(seed),
            profiler: Profiler::new(),
            generation: 0,
            state: RunState::Idle,
            elapsed: Duration::ZERO,
            recent: VecDeque::new(),
            counters: RunCounters::default(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register an objective. Fails once the population has been seeded.
    pub fn register_objective<F>(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&C) -> Result<f64, BoxError> + Send + Sync + 'static,
    {
        self.objectives.register(name, direction, func)
    }

    /// Register an agent that consumes `arity` sampled candidates.
    pub fn register_agent<F>(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Vec<C>, &mut StdRng) -> C + Send + Sync + 'static,
    {
        self.agents.register(name, arity, func)
    }

    /// Evaluate and insert the initial candidate.
    pub fn seed(&mut self, candidate: C) -> Result<CandidateId, EvolutionError> {
        let id = self.population.seed(&mut self.objectives, candidate)?;
        self.remember_scores(id);
        info!(
            "Seeded population with {} objectives",
            self.objectives.len()
        );
        Ok(id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn objectives(&self) -> &ObjectiveRegistry<C> {
        &self.objectives
    }

    pub fn agents(&self) -> &AgentRegistry<C> {
        &self.agents
    }

    pub fn population(&self) -> &Population<C> {
        &self.population
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    /// Steps taken over the engine's lifetime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run one dominance filter pass over the active set.
    pub fn filter(&mut self) -> Result<FilterReport, DominanceError> {
        let report = self
            .profiler
            .time(FILTER_SECTION, || self.population.reduce())?;
        self.counters.filter_passes += 1;
        Ok(report)
    }

    fn ensure_ready(&self) -> Result<(), EvolutionError> {
        if self.objectives.is_empty() {
            return Err(EvolutionError::NoObjectives);
        }
        if self.agents.is_empty() {
            return Err(EvolutionError::NoAgents);
        }
        if !self.population.is_seeded() {
            return Err(EvolutionError::NotSeeded);
        }
        Ok(())
    }

    fn remember_scores(&mut self, id: CandidateId) {
        let Some(entry) = self.population.get(id) else {
            return;
        };
        self.recent.push_back(entry.scores.clone());
        while self.recent.len() > self.config.run.status_history_len {
            self.recent.pop_front();
        }
    }
}

impl<C: Clone> Engine<C> {
    /// Perform one step: pick an agent at random, sample its inputs from the
    /// active set, evaluate and insert its result.
    ///
    /// The generation counter advances even when the step is skipped or the
    /// result is rejected.
    pub fn step(&mut self) -> Result<StepOutcome, EvolutionError> {
        if !self.population.is_seeded() {
            return Err(EvolutionError::NotSeeded);
        }
        let index = self
            .agents
            .choose(&mut self.rng)
            .ok_or(EvolutionError::NoAgents)?;
        let Some((name, arity)) = self.agents.describe(index) else {
            return Err(EvolutionError::NoAgents);
        };

        self.generation += 1;
        let generation = self.generation;

        let samples = self.population.sample(arity, &mut self.rng);
        if samples.len() < arity {
            debug!(
                "Step {}: skipped '{}', sample of {} below arity {}",
                generation,
                name,
                samples.len(),
                arity
            );
            self.counters.skipped += 1;
            return Ok(StepOutcome::Skipped);
        }

        let agents = &self.agents;
        let rng = &mut self.rng;
        let child = match self
            .profiler
            .time(name, || agents.invoke(name, samples, rng))
        {
            Ok(child) => child,
            Err(err) => {
                debug!("Step {}: skipped, {}", generation, err);
                self.counters.skipped += 1;
                return Ok(StepOutcome::Skipped);
            }
        };

        let population = &mut self.population;
        let objectives = &mut self.objectives;
        let inserted = self.profiler.time(EVALUATE_SECTION, || {
            population.insert(objectives, child, generation)
        });

        match inserted {
            Ok(id) => {
                self.counters.insertions += 1;
                self.remember_scores(id);
                Ok(StepOutcome::Inserted(id))
            }
            Err(err) => {
                warn!("Step {}: discarded candidate, {}", generation, err);
                self.counters.failures += 1;
                self.counters.last_failure = Some(err.to_string());
                Ok(StepOutcome::Rejected(err))
            }
        }
    }

    /// Build a status snapshot of the current state.
    pub fn status(&self) -> StatusSnapshot<C> {
        self.snapshot(self.state, self.elapsed, None)
    }

    pub(crate) fn snapshot(
        &self,
        state: RunState,
        elapsed: Duration,
        error: Option<String>,
    ) -> StatusSnapshot<C> {
        let best = self.population.best_by_penalty();
        StatusSnapshot {
            state,
            generation: self.generation,
            elapsed_secs: elapsed.as_secs_f64(),
            best: best.map(|e| e.candidate.clone()),
            best_scores: best.map(|e| e.scores.clone()),
            best_penalty: best.map(|e| e.penalty),
            history: self.recent.iter().cloned().collect(),
            history_size: self.population.len(),
            active_size: self.population.active_len(),
            evaluation_failures: self.counters.failures,
            error,
        }
    }

    /// Validate and prepare a run, publishing the initial `Running` snapshot.
    pub(crate) fn begin(&mut self, run: &RunConfig) -> Result<StatusSnapshot<C>, EvolutionError> {
        let config = EngineConfig {
            run: run.clone(),
            ..self.config.clone()
        };
        config.validate()?;
        self.ensure_ready()?;
        self.config = config;
        self.counters = RunCounters::default();
        self.profiler.clear();
        self.elapsed = Duration::ZERO;
        self.state = RunState::Running;
        Ok(self.snapshot(RunState::Running, Duration::ZERO, None))
    }

    /// Run evolution with a callback receiving every published snapshot.
    ///
    /// Stops when the time limit is exceeded, the cancellation flag is set, or
    /// `max_steps` is reached. Cancellation is checked before every step. A
    /// final dominance filter pass always runs before the terminal snapshot.
    pub fn run_with_callback<F>(
        &mut self,
        run: &RunConfig,
        mut callback: F,
    ) -> Result<RunSummary, EvolutionError>
    where
        F: FnMut(StatusSnapshot<C>),
    {
        callback(self.begin(run)?);
        self.run_loop(run, callback)
    }

    /// Run evolution (blocking).
    pub fn run(&mut self, run: &RunConfig) -> Result<RunSummary, EvolutionError> {
        self.run_with_callback(run, |_| {})
    }

    /// The loop proper. Expects [`Engine::begin`] to have succeeded.
    pub(crate) fn run_loop<F>(
        &mut self,
        run: &RunConfig,
        mut callback: F,
    ) -> Result<RunSummary, EvolutionError>
    where
        F: FnMut(StatusSnapshot<C>),
    {
        let time_limit = run.time_limit();
        let start_generation = self.generation;
        let start = Instant::now();
        info!(
            "Evolution started: {} agents, time limit {:.1}s, filter every {} steps",
            self.agents.len(),
            run.time_limit_secs,
            run.filter_interval
        );

        let mut fatal: Option<DominanceError> = None;
        let stop_reason = loop {
            if self.cancelled.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }
            if start.elapsed() >= time_limit {
                break StopReason::TimeLimit;
            }
            let steps = self.generation - start_generation;
            if let Some(max) = run.max_steps
                && steps >= max
            {
                break StopReason::StepLimit;
            }

            self.step()?;

            if steps % run.filter_interval as u64 == 0
                && let Err(err) = self.filter()
            {
                error!("Dominance filter failed at step {}: {}", self.generation, err);
                let reason = StopReason::Error(err.to_string());
                fatal = Some(err);
                break reason;
            }

            let steps = steps + 1;
            if steps % run.log_interval as u64 == 0
                && let Some(best) = self.population.best_by_penalty()
            {
                info!(
                    "Generation {}: best penalty = {:.3}, active = {}, history = {}",
                    self.generation,
                    best.penalty,
                    self.population.active_len(),
                    self.population.len()
                );
            }

            callback(self.snapshot(RunState::Running, start.elapsed(), None));
        };

        // Terminal pass, on every exit path.
        let stop_reason = match self.filter() {
            Ok(_) => stop_reason,
            Err(err) => {
                error!("Terminal dominance filter failed: {}", err);
                let reason = StopReason::Error(err.to_string());
                fatal.get_or_insert(err);
                reason
            }
        };

        let elapsed = start.elapsed();
        self.elapsed = elapsed;
        self.state = stop_reason.terminal_state();
        let error_message = match &stop_reason {
            StopReason::Error(msg) => Some(msg.clone()),
            _ => None,
        };
        callback(self.snapshot(self.state, elapsed, error_message));

        let generations = self.generation - start_generation;
        info!(
            "Evolution stopped ({:?}) after {} steps in {:.2}s: {} active, {} evaluated, {} failures",
            stop_reason,
            generations,
            elapsed.as_secs_f64(),
            self.population.active_len(),
            self.population.total_inserted(),
            self.counters.failures
        );
        self.profiler.report();

        if let Some(err) = fatal {
            return Err(err.into());
        }

        let elapsed_seconds = elapsed.as_secs_f64();
        Ok(RunSummary {
            stop_reason,
            generations,
            insertions: self.counters.insertions,
            skipped_steps: self.counters.skipped,
            evaluation_failures: self.counters.failures,
            last_failure: self.counters.last_failure.clone(),
            filter_passes: self.counters.filter_passes,
            elapsed_seconds,
            steps_per_second: if elapsed_seconds > 0.0 {
                generations as f64 / elapsed_seconds
            } else {
                0.0
            },
            profile: self.profiler.rows(),
        })
    }
}
