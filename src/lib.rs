//! Lineup Evo - Multi-objective evolutionary optimization.
//!
//! This crate provides a generic, time-boxed evolution engine: registered
//! agents propose new candidates from the current population, registered
//! objectives score them, and a periodic Pareto dominance filter keeps only
//! the non-dominated trade-offs. A baseball batting-order problem is built on
//! top of it.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, score, status and lineup data types
//! - `compute`: The evolution engine and the lineup objectives and agents
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use lineup_evo::{
//!     compute::evolution::Engine,
//!     compute::lineup::{StatTable, register_lineup_agents, register_lineup_objectives},
//!     schema::{EngineConfig, Lineup},
//! };
//!
//! let stats = Arc::new(StatTable::from_path("stats.json").unwrap());
//! let lineup: Lineup =
//!     serde_json::from_str(&std::fs::read_to_string("lineup.json").unwrap()).unwrap();
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! register_lineup_objectives(&mut engine, stats.clone()).unwrap();
//! register_lineup_agents(&mut engine, stats).unwrap();
//! engine.seed(lineup).unwrap();
//!
//! let handle = engine.start(Duration::from_secs(60), 50).unwrap();
//! let best = handle.wait_until_done().unwrap();
//! println!("Best penalty: {:.3}", best.penalty);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{Engine, EvolutionError, EvolutionHandle, RunReport};
pub use schema::{EngineConfig, Lineup, RunConfig, StatusSnapshot};
