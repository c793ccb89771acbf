//! Player statistics lookup.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::Lineup;

/// Batting statistics the lineup objectives and agents consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stat {
    /// Batting average.
    Avg,
    /// On-base percentage.
    Obp,
    /// Slugging percentage.
    Slg,
    /// On-base plus slugging.
    Ops,
}

impl Stat {
    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Avg => "AVG",
            Stat::Obp => "OBP",
            Stat::Slg => "SLG",
            Stat::Ops => "OPS",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVG" => Ok(Stat::Avg),
            "OBP" => Ok(Stat::Obp),
            "SLG" => Ok(Stat::Slg),
            "OPS" => Ok(Stat::Ops),
            _ => Err(StatsError::UnknownStat(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("No stats for player '{0}'")]
    UnknownPlayer(String),
    #[error("Player '{player}' has no {stat}")]
    MissingStat { player: String, stat: Stat },
    #[error("Unknown stat '{0}'")]
    UnknownStat(String),
    #[error("Failed to read stats: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse stats: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of per-player statistics.
pub trait StatsProvider: Send + Sync {
    fn stat(&self, player: &str, stat: Stat) -> Result<f64, StatsError>;
}

/// One player's line. Any stat may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(rename = "AVG", default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(rename = "OBP", default, skip_serializing_if = "Option::is_none")]
    pub obp: Option<f64>,
    #[serde(rename = "SLG", default, skip_serializing_if = "Option::is_none")]
    pub slg: Option<f64>,
    #[serde(rename = "OPS", default, skip_serializing_if = "Option::is_none")]
    pub ops: Option<f64>,
}

impl StatLine {
    pub fn new(avg: f64, obp: f64, slg: f64) -> Self {
        Self {
            avg: Some(avg),
            obp: Some(obp),
            slg: Some(slg),
            ops: None,
        }
    }

    /// Value of `stat`. OPS falls back to OBP + SLG.
    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::Avg => self.avg,
            Stat::Obp => self.obp,
            Stat::Slg => self.slg,
            Stat::Ops => self.ops.or_else(|| Some(self.obp? + self.slg?)),
        }
    }
}

/// In-memory stats keyed by player name.
///
/// Serialized as a JSON object mapping names to stat lines:
///
/// ```json
/// { "Aaron Judge": { "AVG": 0.322, "OBP": 0.458, "SLG": 0.701 } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatTable {
    players: HashMap<String, StatLine>,
}

impl StatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, StatsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, StatsError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Add or replace a player's line.
    pub fn insert(&mut self, player: impl Into<String>, line: StatLine) {
        self.players.insert(player.into(), line);
    }

    /// Builder form of [`StatTable::insert`].
    pub fn with(mut self, player: impl Into<String>, line: StatLine) -> Self {
        self.insert(player, line);
        self
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// `stat` for every hitter, in batting order.
pub(super) fn stats_in_order(
    stats: &dyn StatsProvider,
    lineup: &Lineup,
    stat: Stat,
) -> Result<Vec<f64>, StatsError> {
    lineup
        .lineup
        .iter()
        .map(|p| stats.stat(&p.name, stat))
        .collect()
}

impl StatsProvider for StatTable {
    fn stat(&self, player: &str, stat: Stat) -> Result<f64, StatsError> {
        let line = self
            .players
            .get(player)
            .ok_or_else(|| StatsError::UnknownPlayer(player.to_string()))?;
        line.get(stat).ok_or_else(|| StatsError::MissingStat {
            player: player.to_string(),
            stat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Player;

    #[test]
    fn test_load_and_lookup() {
        let table = StatTable::from_json_str(
            r#"{
                "A": {"AVG": 0.300, "OBP": 0.400, "SLG": 0.500},
                "B": {"AVG": 0.250, "OPS": 0.800}
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.stat("A", Stat::Avg).unwrap(), 0.300);
        assert!((table.stat("A", Stat::Ops).unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(table.stat("B", Stat::Ops).unwrap(), 0.800);
        assert!(matches!(
            table.stat("B", Stat::Obp),
            Err(StatsError::MissingStat { stat: Stat::Obp, .. })
        ));
        assert!(matches!(
            table.stat("C", Stat::Avg),
            Err(StatsError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn test_builder_and_batting_order() {
        let table = StatTable::new()
            .with("A", StatLine::new(0.300, 0.400, 0.500))
            .with("B", StatLine::new(0.250, 0.310, 0.380))
            .with("A", StatLine::new(0.280, 0.390, 0.470));
        assert_eq!(table.len(), 2);
        assert_eq!(table.stat("A", Stat::Avg).unwrap(), 0.280);

        let lineup = Lineup::new(vec![Player::new("B", "C"), Player::new("A", "1B")], vec![]);
        assert_eq!(
            stats_in_order(&table, &lineup, Stat::Obp).unwrap(),
            vec![0.310, 0.390]
        );

        let lineup = Lineup::new(vec![Player::new("A", "1B"), Player::new("Z", "SS")], vec![]);
        assert!(matches!(
            stats_in_order(&table, &lineup, Stat::Slg),
            Err(StatsError::UnknownPlayer(name)) if name == "Z"
        ));
    }

    #[test]
    fn test_stat_from_str() {
        assert_eq!("obp".parse::<Stat>().unwrap(), Stat::Obp);
        assert_eq!(Stat::Slg.to_string(), "SLG");
        assert!("ERA".parse::<Stat>().is_err());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            StatTable::from_json_str("[1, 2]"),
            Err(StatsError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        fs::write(&path, r#"{"A": {"OBP": 0.35}}"#).unwrap();
        let table = StatTable::from_path(&path).unwrap();
        assert_eq!(table.stat("A", Stat::Obp).unwrap(), 0.35);
        assert!(StatTable::from_path(dir.path().join("missing.json")).is_err());
    }
}
