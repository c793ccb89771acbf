//! Multi-objective evolution engine.
//!
//! Candidates of any type are improved by a population of registered agents
//! and scored by registered objectives. The engine keeps every evaluated
//! candidate and periodically prunes the active set to its Pareto front.
//!
//! # Overview
//!
//! - **Objectives** (`objective`): named scoring functions with a direction
//! - **Agents** (`agent`): named transformations over sampled candidates
//! - **Population** (`population`): history plus the active set
//! - **Dominance** (`dominance`): Pareto comparison and reduction
//! - **Engine** (`engine`, `handle`): the run loop, in place or on a thread
//! - **Report** (`report`): score tables and JSON export
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use lineup_evo::compute::evolution::Engine;
//! use lineup_evo::schema::{Direction, EngineConfig};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine
//!     .register_objective("distance", Direction::Minimize, |x: &f64| Ok(x.abs()))
//!     .unwrap();
//! engine
//!     .register_agent("halve", 1, |inputs: Vec<f64>, _| inputs[0] / 2.0)
//!     .unwrap();
//! engine.seed(100.0).unwrap();
//!
//! let handle = engine.start(Duration::from_secs(1), 10).unwrap();
//! println!("Generation {}", handle.status().generation);
//! let best = handle.wait_until_done().unwrap();
//! println!("Best: {} (penalty {:.3})", best.candidate, best.penalty);
//! ```

mod agent;
mod dominance;
mod engine;
mod error;
mod handle;
mod objective;
mod population;
mod profiler;
mod report;

pub use agent::{AgentFn, AgentRegistry};
pub use dominance::{check_shape, dominates, non_dominated};
pub use engine::{EVALUATE_SECTION, Engine, FILTER_SECTION, StepOutcome};
pub use error::{BoxError, DominanceError, EvaluationError, EvolutionError, RegistryError};
pub use handle::{EvolutionHandle, FinishedRun, StatusSlot};
pub use objective::{ObjectiveFn, ObjectiveRegistry};
pub use population::Population;
pub use profiler::Profiler;
pub use report::{
    BEST_FILE, DIFFERENCES_FILE, FRONT_FILE, RunReport, SCORES_FILE, score_differences,
};
