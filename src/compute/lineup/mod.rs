//! Baseball batting-order optimization on top of the evolution engine.
//!
//! Objectives and agents read player statistics through a [`StatsProvider`],
//! injected once at registration.

mod agents;
mod objectives;
mod stats;

pub use agents::*;
pub use objectives::*;
pub use stats::*;
