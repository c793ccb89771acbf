//! Schema module - Configuration, status and candidate types.

mod config;
mod evolution;
mod lineup;

pub use config::*;
pub use evolution::*;
pub use lineup::*;
