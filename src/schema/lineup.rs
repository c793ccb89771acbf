//! Lineup candidate types.
//!
//! A [`Lineup`] is the concrete candidate evolved by the lineup objectives and
//! agents. The engine itself never looks inside it.

use serde::{Deserialize, Serialize};

/// Number of batting slots in a lineup.
pub const LINEUP_SIZE: usize = 9;

/// Position label used for players sitting on the bench.
pub const BENCH_POSITION: &str = "Bench";

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player name, used as the stats lookup key.
    pub name: String,
    /// Primary position code (e.g. "SS", "CF").
    pub position: String,
    /// Position the player fields in this lineup, or [`BENCH_POSITION`].
    #[serde(default)]
    pub defensive_position: String,
}

impl Player {
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        let position = position.into();
        Self {
            name: name.into(),
            defensive_position: position.clone(),
            position,
        }
    }

    /// Same player, moved to the bench.
    pub fn benched(mut self) -> Self {
        self.defensive_position = BENCH_POSITION.to_string();
        self
    }
}

/// Game-level context the lineup is built for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameContext {
    #[serde(default)]
    pub opposing_pitcher: Option<String>,
    /// "L" or "R".
    #[serde(default)]
    pub pitcher_throws: Option<String>,
    #[serde(default)]
    pub ballpark: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
}

/// A batting order plus the bench it can draw from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lineup {
    /// Batting order, leadoff first.
    pub lineup: Vec<Player>,
    /// Available substitutes.
    #[serde(default, alias = "available_roster")]
    pub bench: Vec<Player>,
    #[serde(default)]
    pub context: GameContext,
}

impl Lineup {
    pub fn new(lineup: Vec<Player>, bench: Vec<Player>) -> Self {
        Self {
            lineup,
            bench,
            context: GameContext::default(),
        }
    }

    /// Attach game context.
    pub fn with_context(mut self, context: GameContext) -> Self {
        self.context = context;
        self
    }

    /// True if every batting slot is filled.
    pub fn is_full(&self) -> bool {
        self.lineup.len() == LINEUP_SIZE
    }

    /// Names in batting order.
    pub fn batting_order(&self) -> impl Iterator<Item = &str> {
        self.lineup.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_legacy_roster_key() {
        let json = r#"{
            "lineup": [{"name": "A", "position": "C"}],
            "available_roster": [{"name": "B", "position": "C", "defensive_position": "Bench"}]
        }"#;
        let lineup: Lineup = serde_json::from_str(json).unwrap();
        assert_eq!(lineup.bench.len(), 1);
        assert_eq!(lineup.bench[0].defensive_position, BENCH_POSITION);
        assert!(!lineup.is_full());
    }

    #[test]
    fn test_benched() {
        let player = Player::new("A", "SS");
        assert_eq!(player.defensive_position, "SS");
        assert_eq!(player.benched().defensive_position, BENCH_POSITION);
    }

    #[test]
    fn test_batting_order() {
        let lineup = Lineup::new(vec![Player::new("A", "C"), Player::new("B", "1B")], vec![]);
        assert_eq!(lineup.batting_order().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
