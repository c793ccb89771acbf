//! Error types for the evolution engine.

use crate::schema::ConfigError;

/// Boxed error returned by objective functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registry misuse. Always surfaced to the caller at setup time.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },
    #[error("Objectives cannot be registered once the population is seeded")]
    Closed,
    #[error("Agent '{name}' must take at least one input candidate")]
    InvalidArity { name: String },
    #[error("No agent named '{name}'")]
    UnknownAgent { name: String },
    #[error("Agent '{agent}' needs {required} input candidates, got {provided}")]
    InsufficientInput {
        agent: String,
        required: usize,
        provided: usize,
    },
}

/// An objective failed on a candidate. The candidate is discarded.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Objective '{objective}' failed: {source}")]
    Failed {
        objective: String,
        #[source]
        source: BoxError,
    },
    #[error("Objective '{objective}' returned non-finite value {value}")]
    NonFinite { objective: String, value: f64 },
}

impl EvaluationError {
    /// Name of the objective that failed.
    pub fn objective(&self) -> &str {
        match self {
            EvaluationError::Failed { objective, .. } => objective,
            EvaluationError::NonFinite { objective, .. } => objective,
        }
    }
}

/// Dominance filter failure. Fatal to a run.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DominanceError {
    #[error("Score vector shape mismatch: expected {expected} objectives, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("Dominance filter failed: {0}")]
    Dominance(#[from] DominanceError),
    #[error("Population has already been seeded")]
    AlreadySeeded,
    #[error("Population has not been seeded")]
    NotSeeded,
    #[error("No objectives registered")]
    NoObjectives,
    #[error("No agents registered")]
    NoAgents,
    #[error("Evolution thread panicked: {0}")]
    Panicked(String),
    #[error("Failed to spawn evolution thread: {0}")]
    Spawn(#[from] std::io::Error),
}
