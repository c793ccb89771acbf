//! Evolution data types: score vectors, population entries, status snapshots
//! and run results.
//!
//! Everything here is plain data. The engine in `compute::evolution` produces
//! these values and hosts consume them (for display, polling or export).

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Unique, monotonically increasing identifier assigned to every inserted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub u64);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Optimization direction declared when an objective is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Lower raw values are better. Stored as-is.
    #[default]
    Minimize,
    /// Higher raw values are better. Stored negated.
    Maximize,
}

impl Direction {
    /// Convert a raw objective value into the lower-is-better convention.
    #[inline]
    pub fn normalize(self, raw: f64) -> f64 {
        match self {
            Direction::Minimize => raw,
            Direction::Maximize => -raw,
        }
    }
}

/// A single objective's normalized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Objective name.
    pub objective: String,
    /// Normalized value (lower is better).
    pub value: f64,
}

/// Ordered objective scores of one candidate, in registration order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreVector {
    scores: Vec<Score>,
}

impl ScoreVector {
    /// Create from scores already in registration order.
    pub fn new(scores: Vec<Score>) -> Self {
        Self { scores }
    }

    /// Build from `(name, value)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            scores: pairs
                .into_iter()
                .map(|(objective, value)| Score {
                    objective: objective.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Number of objectives.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if there are no objectives.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores in registration order.
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// Normalized values in registration order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().map(|s| s.value)
    }

    /// Look up a value by objective name.
    pub fn get(&self, objective: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.objective == objective)
            .map(|s| s.value)
    }

    /// Sum of all values.
    pub fn penalty(&self) -> f64 {
        self.values().sum()
    }
}

impl fmt::Display for ScoreVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, score) in self.scores.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.3}", score.objective, score.value)?;
        }
        f.write_str("}")
    }
}

/// An evaluated candidate held by the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationEntry<C> {
    /// Unique identifier.
    pub id: CandidateId,
    /// Objective scores.
    pub scores: ScoreVector,
    /// The candidate itself.
    pub candidate: C,
    /// Sum of the scores. Used for "best so far" reporting only.
    pub penalty: f64,
    /// Step that produced this candidate (0 for the seed).
    pub generation: u64,
}

/// Lifecycle state of an evolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Not started.
    #[default]
    Idle,
    /// Stepping.
    Running,
    /// Stopped by external cancellation.
    Stopped,
    /// Time limit exceeded.
    Expired,
    /// Step limit reached.
    Completed,
    /// Stopped by a fatal internal error.
    Failed,
}

impl RunState {
    /// True once the run has terminated, whatever the cause.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Stopped | RunState::Expired | RunState::Completed | RunState::Failed
        )
    }
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Wall-clock budget exhausted.
    TimeLimit,
    /// Reached `max_steps`.
    StepLimit,
    /// User cancelled.
    Cancelled,
    /// Error occurred.
    Error(String),
}

impl StopReason {
    /// Terminal run state for this stop reason.
    pub fn terminal_state(&self) -> RunState {
        match self {
            StopReason::TimeLimit => RunState::Expired,
            StopReason::StepLimit => RunState::Completed,
            StopReason::Cancelled => RunState::Stopped,
            StopReason::Error(_) => RunState::Failed,
        }
    }
}

/// Immutable progress record published after every step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot<C> {
    /// Current run state.
    pub state: RunState,
    /// Steps taken so far, including skipped and failed ones.
    pub generation: u64,
    /// Seconds since the run started.
    pub elapsed_secs: f64,
    /// Lowest-penalty candidate seen so far.
    pub best: Option<C>,
    /// Scores of `best`.
    pub best_scores: Option<ScoreVector>,
    /// Penalty of `best`.
    pub best_penalty: Option<f64>,
    /// Most recently evaluated score vectors, oldest first.
    pub history: Vec<ScoreVector>,
    /// Entries retained in the full history.
    pub history_size: usize,
    /// Entries in the active (non-dominated) set.
    pub active_size: usize,
    /// Steps aborted because an objective failed.
    pub evaluation_failures: u64,
    /// Fatal error message when `state` is `Failed`.
    pub error: Option<String>,
}

impl<C> StatusSnapshot<C> {
    /// Snapshot of an engine that has not started.
    pub fn idle() -> Self {
        Self {
            state: RunState::Idle,
            generation: 0,
            elapsed_secs: 0.0,
            best: None,
            best_scores: None,
            best_penalty: None,
            history: Vec::new(),
            history_size: 0,
            active_size: 0,
            evaluation_failures: 0,
            error: None,
        }
    }

    /// True while the run is stepping.
    pub fn running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Elapsed time as a [`Duration`].
    pub fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(self.elapsed_secs.max(0.0))
    }
}

/// Active set size before and after a dominance filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub before: usize,
    pub after: usize,
}

impl FilterReport {
    /// Number of candidates evicted from the active set.
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Accumulated timing for one instrumented section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    /// Section name (an agent name, `evaluate` or `filter`).
    pub name: String,
    /// Number of calls.
    pub calls: u64,
    /// Total seconds spent.
    pub total_secs: f64,
    /// Average seconds per call.
    pub secs_per_call: f64,
}

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Reason for stopping.
    pub stop_reason: StopReason,
    /// Total steps taken.
    pub generations: u64,
    /// Candidates evaluated and inserted during the run.
    pub insertions: u64,
    /// Steps skipped because the sample was too small.
    pub skipped_steps: u64,
    /// Steps aborted because an objective failed.
    pub evaluation_failures: u64,
    /// Most recent evaluation failure, for diagnostics.
    pub last_failure: Option<String>,
    /// Dominance filter passes, including the terminal one.
    pub filter_passes: u64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Steps per second.
    pub steps_per_second: f64,
    /// Per-section timings.
    pub profile: Vec<ProfileRow>,
}

/// One row of the evaluated-score summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: CandidateId,
    pub generation: u64,
    pub scores: ScoreVector,
    pub penalty: f64,
}

/// Change in one objective between the initial and the best candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreDifference {
    pub objective: String,
    pub initial: f64,
    pub final_score: f64,
    pub difference: f64,
}
