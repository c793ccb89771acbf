//! Configuration types for evolution runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_time_limit_secs() -> f64 {
    300.0
}

fn default_filter_interval() -> usize {
    50
}

fn default_status_history_len() -> usize {
    50
}

fn default_log_interval() -> usize {
    50
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Settings for a single evolution run.
    #[serde(default)]
    pub run: RunConfig,
    /// Retention policy for the full evaluation history.
    #[serde(default)]
    pub retention: HistoryRetention,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Settings for a single evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Wall-clock budget in seconds. Zero performs no steps.
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: f64,
    /// Run the dominance filter every this many steps.
    #[serde(default = "default_filter_interval")]
    pub filter_interval: usize,
    /// Optional hard cap on the number of steps.
    #[serde(default)]
    pub max_steps: Option<u64>,
    /// Number of most recent score vectors carried in each status snapshot.
    #[serde(default = "default_status_history_len")]
    pub status_history_len: usize,
    /// Log progress every this many steps.
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            filter_interval: default_filter_interval(),
            max_steps: None,
            status_history_len: default_status_history_len(),
            log_interval: default_log_interval(),
        }
    }
}

impl RunConfig {
    /// Run configuration with the given time budget and filter interval.
    pub fn new(time_limit: Duration, filter_interval: usize) -> Self {
        Self {
            time_limit_secs: time_limit.as_secs_f64(),
            filter_interval,
            ..Default::default()
        }
    }

    /// Cap the run at a fixed number of steps.
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Time budget as a [`Duration`].
    ///
    /// Only meaningful after [`RunConfig::validate`] succeeded.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::MAX)
    }

    /// Validate run parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Infinity is allowed: the run then ends only on cancellation or `max_steps`.
        if self.time_limit_secs.is_nan() || self.time_limit_secs < 0.0 {
            return Err(ConfigError::InvalidTimeLimit(self.time_limit_secs));
        }
        if self.filter_interval == 0 {
            return Err(ConfigError::InvalidFilterInterval);
        }
        if self.status_history_len == 0 {
            return Err(ConfigError::InvalidStatusHistory);
        }
        if self.log_interval == 0 {
            return Err(ConfigError::InvalidLogInterval);
        }
        Ok(())
    }
}

/// How much of the full evaluation history the population keeps.
///
/// The history grows with every evaluated candidate. Long-running hosts should
/// either cap it here or periodically export and discard it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "policy")]
pub enum HistoryRetention {
    /// Keep every evaluated candidate.
    #[default]
    Unbounded,
    /// Keep at most `capacity` entries, evicting the oldest inactive ones first.
    /// Members of the active set are never evicted, so the history can exceed
    /// `capacity` while the active set itself is larger.
    KeepLatest { capacity: usize },
}

impl EngineConfig {
    /// Validate the whole engine configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        if let HistoryRetention::KeepLatest { capacity: 0 } = self.retention {
            return Err(ConfigError::InvalidRetention);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Time limit must be a non-negative number of seconds, got {0}")]
    InvalidTimeLimit(f64),
    #[error("Filter interval must be at least 1")]
    InvalidFilterInterval,
    #[error("Status history length must be at least 1")]
    InvalidStatusHistory,
    #[error("Log interval must be at least 1")]
    InvalidLogInterval,
    #[error("History retention capacity must be at least 1")]
    InvalidRetention,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_filter_interval_rejected() {
        let run = RunConfig::new(Duration::from_secs(1), 0);
        assert_eq!(run.validate(), Err(ConfigError::InvalidFilterInterval));
    }

    #[test]
    fn test_negative_time_limit_rejected() {
        let run = RunConfig {
            time_limit_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(run.validate(), Err(ConfigError::InvalidTimeLimit(-1.0)));
    }

    #[test]
    fn test_zero_time_limit_allowed() {
        let run = RunConfig::new(Duration::ZERO, 1);
        assert!(run.validate().is_ok());
        assert_eq!(run.time_limit(), Duration::ZERO);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = EngineConfig {
            retention: HistoryRetention::KeepLatest { capacity: 0 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRetention));
    }

    #[test]
    fn test_serialization() {
        let json = r#"{"run": {"time_limit_secs": 2.5}, "retention": {"policy": "KeepLatest", "capacity": 100}}"#;
        let parsed: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.run.time_limit_secs, 2.5);
        assert_eq!(parsed.run.filter_interval, 50);
        assert_eq!(
            parsed.retention,
            HistoryRetention::KeepLatest { capacity: 100 }
        );
        assert!(parsed.random_seed.is_none());
    }
}
