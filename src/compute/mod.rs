//! Compute module - the evolution engine and the lineup problem it solves.

pub mod evolution;
pub mod lineup;
