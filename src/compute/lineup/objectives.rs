//! Lineup objectives. Lower is better for all but [`proper_leadoff`].

use std::sync::Arc;

use crate::compute::evolution::{Engine, RegistryError};
use crate::schema::{Direction, LINEUP_SIZE, Lineup};

use super::stats::{Stat, StatsError, StatsProvider, stats_in_order};

/// OBP a leadoff hitter needs.
pub const LEADOFF_MIN_OBP: f64 = 0.350;

pub const BATTING_AVERAGE_UNSORTED: &str = "batting_average_unsorted";
pub const PROPER_LEADOFF: &str = "proper_leadoff";
pub const RUN_PRODUCTION_CASCADE: &str = "run_production_cascade";
pub const BEST_NINE: &str = "best_nine";

#[derive(Debug, thiserror::Error)]
pub enum ObjectiveError {
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("Lineup must contain exactly {expected} players, found {found}")]
    WrongSize { expected: usize, found: usize },
    #[error("Lineup is empty")]
    Empty,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Sum of batting-average increases between consecutive hitters.
///
/// Zero when averages never rise down the order.
pub fn batting_average_unsorted(
    stats: &dyn StatsProvider,
    lineup: &Lineup,
) -> Result<f64, ObjectiveError> {
    let avg = stats_in_order(stats, lineup, Stat::Avg)?;
    let rises: f64 = avg
        .windows(2)
        .filter(|w| w[0] < w[1])
        .map(|w| w[1] - w[0])
        .sum();
    Ok(round3(rises))
}

/// 1 if the leadoff hitter reaches [`LEADOFF_MIN_OBP`], else 0.
pub fn proper_leadoff(stats: &dyn StatsProvider, lineup: &Lineup) -> Result<f64, ObjectiveError> {
    let leadoff = lineup.lineup.first().ok_or(ObjectiveError::Empty)?;
    let obp = stats.stat(&leadoff.name, Stat::Obp)?;
    Ok(if obp >= LEADOFF_MIN_OBP { 1.0 } else { 0.0 })
}

/// How far the OBP-to-next-SLG chain is from its best arrangement.
///
/// Each hitter's OBP is paired with the next hitter's SLG, wrapping from the
/// ninth back to the first. The maximum pairs sorted OBPs with sorted SLGs.
/// Returns `(max - actual)` rounded to three decimals, times ten.
pub fn run_production_cascade(
    stats: &dyn StatsProvider,
    lineup: &Lineup,
) -> Result<f64, ObjectiveError> {
    if !lineup.is_full() {
        return Err(ObjectiveError::WrongSize {
            expected: LINEUP_SIZE,
            found: lineup.lineup.len(),
        });
    }
    let obp = stats_in_order(stats, lineup, Stat::Obp)?;
    let slg = stats_in_order(stats, lineup, Stat::Slg)?;

    let actual: f64 = (0..LINEUP_SIZE)
        .map(|i| obp[i] * slg[(i + 1) % LINEUP_SIZE])
        .sum();

    let mut obp_sorted = obp.clone();
    let mut slg_sorted = slg.clone();
    obp_sorted.sort_by(|a, b| b.total_cmp(a));
    slg_sorted.sort_by(|a, b| b.total_cmp(a));
    let max: f64 = obp_sorted.iter().zip(&slg_sorted).map(|(o, s)| o * s).sum();

    Ok(round3(max - actual) * 10.0)
}

/// Total OPS left on the bench.
///
/// For each hitter, adds `bench OPS - lineup OPS` for every bench player at
/// the same position with a higher OPS. Players without stats are skipped.
/// Zero when the bench is empty or the lineup is not full.
pub fn best_nine(stats: &dyn StatsProvider, lineup: &Lineup) -> Result<f64, ObjectiveError> {
    if lineup.bench.is_empty() || !lineup.is_full() {
        return Ok(0.0);
    }

    let mut penalty = 0.0;
    for starter in &lineup.lineup {
        let Ok(starter_ops) = stats.stat(&starter.name, Stat::Ops) else {
            continue;
        };
        penalty += lineup
            .bench
            .iter()
            .filter(|b| b.position == starter.position)
            .filter_map(|b| stats.stat(&b.name, Stat::Ops).ok())
            .filter(|&ops| ops > starter_ops)
            .map(|ops| ops - starter_ops)
            .sum::<f64>();
    }
    Ok(round3(penalty))
}

/// Register all four lineup objectives against `stats`.
pub fn register_lineup_objectives(
    engine: &mut Engine<Lineup>,
    stats: Arc<dyn StatsProvider>,
) -> Result<(), RegistryError> {
    type Scorer = fn(&dyn StatsProvider, &Lineup) -> Result<f64, ObjectiveError>;
    let objectives: [(&str, Direction, Scorer); 4] = [
        (BATTING_AVERAGE_UNSORTED, Direction::Minimize, batting_average_unsorted),
        (PROPER_LEADOFF, Direction::Maximize, proper_leadoff),
        (RUN_PRODUCTION_CASCADE, Direction::Minimize, run_production_cascade),
        (BEST_NINE, Direction::Minimize, best_nine),
    ];

    for (name, direction, scorer) in objectives {
        let stats = Arc::clone(&stats);
        engine.register_objective(name, direction, move |lineup: &Lineup| {
            Ok(scorer(stats.as_ref(), lineup)?)
        })?;
    }
    Ok(())
}
