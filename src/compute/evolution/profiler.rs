//! Call counts and cumulative wall time per named section.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::info;

use crate::schema::ProfileRow;

#[derive(Debug, Clone, Copy, Default)]
struct Timing {
    calls: u64,
    total: Duration,
}

/// Lightweight section profiler.
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    sections: BTreeMap<String, Timing>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, charging its wall time to `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.record(name, start.elapsed());
        value
    }

    /// Charge one call of `elapsed` to `name`.
    pub fn record(&mut self, name: &str, elapsed: Duration) {
        if let Some(timing) = self.sections.get_mut(name) {
            timing.calls += 1;
            timing.total += elapsed;
            return;
        }
        self.sections.insert(
            name.to_string(),
            Timing {
                calls: 1,
                total: elapsed,
            },
        );
    }

    /// Number of calls recorded for `name`.
    pub fn calls(&self, name: &str) -> u64 {
        self.sections.get(name).map_or(0, |t| t.calls)
    }

    /// One row per section, sorted by name.
    pub fn rows(&self) -> Vec<ProfileRow> {
        self.sections
            .iter()
            .map(|(name, timing)| {
                let total_secs = timing.total.as_secs_f64();
                ProfileRow {
                    name: name.clone(),
                    calls: timing.calls,
                    total_secs,
                    secs_per_call: if timing.calls > 0 {
                        total_secs / timing.calls as f64
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }

    /// Log the profile table.
    pub fn report(&self) {
        info!("{:20} {:>8} {:>12} {:>12}", "Section", "Calls", "TotSec", "Sec/Call");
        for row in self.rows() {
            info!(
                "{:20} {:>8} {:>12.6} {:>12.6}",
                row.name, row.calls, row.total_secs, row.secs_per_call
            );
        }
    }

    pub fn clear(&mut self) {
        self.sections.clear();
    }
}
