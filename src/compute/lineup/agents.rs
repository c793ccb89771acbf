//! Lineup agents. Each takes one lineup and returns a modified copy, or the
//! input unchanged when it finds nothing to improve.

use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::compute::evolution::{Engine, RegistryError};
use crate::schema::{BENCH_POSITION, LINEUP_SIZE, Lineup};

use super::stats::{Stat, StatsProvider, stats_in_order};

/// Minimum OPS gain for a bench substitution.
pub const BENCH_OPS_MARGIN: f64 = 0.025;
/// SLG below which a hitter wastes the OBP batting ahead.
pub const WEAK_SLG: f64 = 0.400;
/// OBP below which a hitter wastes the SLG batting behind.
pub const WEAK_OBP: f64 = 0.320;
/// Improvement a replacement needs over the weak hitter.
pub const REPLACEMENT_MARGIN: f64 = 0.05;
/// How many top hitters by OBP or SLG are checked for waste.
const TOP_HITTERS: usize = 4;

pub const SWAPPER: &str = "swapper";
pub const BETTER_BENCH: &str = "better_bench";
pub const WASTED_OBP: &str = "wasted_obp";
pub const WASTED_SLG: &str = "wasted_slg";

/// Swap two random batting slots. The slots may coincide.
pub fn swapper(mut lineup: Lineup, rng: &mut StdRng) -> Lineup {
    let n = lineup.lineup.len();
    if n > 0 {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        lineup.lineup.swap(i, j);
    }
    lineup
}

/// Promote the bench player with the largest OPS gain over a starter at the
/// same position, if the gain exceeds [`BENCH_OPS_MARGIN`].
///
/// The promoted player takes the starter's batting slot and defensive
/// position; the starter moves to the bench.
pub fn better_bench(stats: &dyn StatsProvider, mut lineup: Lineup) -> Lineup {
    if !lineup.is_full() || lineup.bench.is_empty() {
        return lineup;
    }

    let mut best: Option<(usize, usize, f64)> = None;
    for (slot, starter) in lineup.lineup.iter().enumerate() {
        let Ok(starter_ops) = stats.stat(&starter.name, Stat::Ops) else {
            continue;
        };
        for (bench_idx, sub) in lineup.bench.iter().enumerate() {
            if sub.position != starter.position {
                continue;
            }
            let Ok(sub_ops) = stats.stat(&sub.name, Stat::Ops) else {
                continue;
            };
            let gain = sub_ops - starter_ops;
            if sub_ops > starter_ops + BENCH_OPS_MARGIN
                && best.is_none_or(|(_, _, best_gain)| gain > best_gain)
            {
                best = Some((slot, bench_idx, gain));
            }
        }
    }

    if let Some((slot, bench_idx, _)) = best {
        let field_position = lineup.lineup[slot].defensive_position.clone();
        let mut promoted = lineup.bench[bench_idx].clone();
        promoted.defensive_position = field_position;
        let demoted = std::mem::replace(&mut lineup.lineup[slot], promoted);
        lineup.bench[bench_idx] = demoted.benched();
    }
    lineup
}

/// Indices of the [`TOP_HITTERS`] highest values, best first.
fn top_slots(values: &[f64]) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..values.len()).collect();
    slots.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    slots.truncate(TOP_HITTERS);
    slots
}

/// Swap slot `weak` with a random other slot whose `values` beat it by
/// [`REPLACEMENT_MARGIN`].
fn replace_weak(lineup: &mut Lineup, values: &[f64], weak: usize, rng: &mut StdRng) {
    let threshold = values[weak] + REPLACEMENT_MARGIN;
    let better: Vec<usize> = (0..values.len())
        .filter(|&i| i != weak && values[i] > threshold)
        .collect();
    if let Some(&other) = better.choose(rng) {
        lineup.lineup.swap(weak, other);
    }
}

/// Fix a top-OBP hitter followed by a weak slugger.
///
/// Picks one such pair at random and swaps the slugger's slot with a hitter
/// whose SLG beats it by [`REPLACEMENT_MARGIN`].
pub fn wasted_obp(stats: &dyn StatsProvider, mut lineup: Lineup, rng: &mut StdRng) -> Lineup {
    if !lineup.is_full() {
        return lineup;
    }
    let (Ok(obp), Ok(slg)) = (
        stats_in_order(stats, &lineup, Stat::Obp),
        stats_in_order(stats, &lineup, Stat::Slg),
    ) else {
        return lineup;
    };

    let wasted: Vec<usize> = top_slots(&obp)
        .into_iter()
        .map(|slot| (slot + 1) % LINEUP_SIZE)
        .filter(|&next| slg[next] < WEAK_SLG)
        .collect();

    if let Some(&weak) = wasted.choose(rng) {
        replace_weak(&mut lineup, &slg, weak, rng);
    }
    lineup
}

/// Fix a weak on-base hitter ahead of a top-SLG hitter.
///
/// Picks one such pair at random and swaps the weak hitter's slot with a
/// hitter whose OBP beats it by [`REPLACEMENT_MARGIN`].
pub fn wasted_slg(stats: &dyn StatsProvider, mut lineup: Lineup, rng: &mut StdRng) -> Lineup {
    if !lineup.is_full() {
        return lineup;
    }
    let (Ok(obp), Ok(slg)) = (
        stats_in_order(stats, &lineup, Stat::Obp),
        stats_in_order(stats, &lineup, Stat::Slg),
    ) else {
        return lineup;
    };

    let wasted: Vec<usize> = top_slots(&slg)
        .into_iter()
        .map(|slot| (slot + LINEUP_SIZE - 1) % LINEUP_SIZE)
        .filter(|&prev| obp[prev] < WEAK_OBP)
        .collect();

    if let Some(&weak) = wasted.choose(rng) {
        replace_weak(&mut lineup, &obp, weak, rng);
    }
    lineup
}

/// Register all four lineup agents, each taking one input.
pub fn register_lineup_agents(
    engine: &mut Engine<Lineup>,
    stats: Arc<dyn StatsProvider>,
) -> Result<(), RegistryError> {
    engine.register_agent(SWAPPER, 1, |inputs: Vec<Lineup>, rng: &mut StdRng| {
        swapper(first(inputs), rng)
    })?;

    let s = Arc::clone(&stats);
    engine.register_agent(BETTER_BENCH, 1, move |inputs: Vec<Lineup>, _: &mut StdRng| {
        better_bench(s.as_ref(), first(inputs))
    })?;

    let s = Arc::clone(&stats);
    engine.register_agent(WASTED_OBP, 1, move |inputs: Vec<Lineup>, rng: &mut StdRng| {
        wasted_obp(s.as_ref(), first(inputs), rng)
    })?;

    engine.register_agent(WASTED_SLG, 1, move |inputs: Vec<Lineup>, rng: &mut StdRng| {
        wasted_slg(stats.as_ref(), first(inputs), rng)
    })?;
    Ok(())
}

fn first(inputs: Vec<Lineup>) -> Lineup {
    inputs.into_iter().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::lineup::stats::{StatLine, StatTable};
    use crate::schema::Player;
    use rand::SeedableRng;

    fn fixture(rows: &[(f64, f64)]) -> (StatTable, Lineup) {
        let mut table = StatTable::new();
        let mut players = Vec::new();
        for (i, &(obp, slg)) in rows.iter().enumerate() {
            let name = format!("p{i}");
            table.insert(&name, StatLine::new(0.250, obp, slg));
            players.push(Player::new(name, format!("P{i}")));
        }
        (table, Lineup::new(players, vec![]))
    }

    fn names(lineup: &Lineup) -> Vec<&str> {
        lineup.batting_order().collect()
    }

    #[test]
    fn test_swapper_permutes() {
        let (_, lineup) = fixture(&[(0.3, 0.4); LINEUP_SIZE]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let swapped = swapper(lineup.clone(), &mut rng);
            let mut before = names(&lineup);
            let mut after = names(&swapped);
            before.sort();
            after.sort();
            assert_eq!(before, after);
        }
        assert_eq!(swapper(Lineup::default(), &mut rng), Lineup::default());
    }

    #[test]
    fn test_better_bench_promotes_best_gain() {
        let (mut table, mut lineup) = fixture(&[(0.3, 0.4); LINEUP_SIZE]);
        table.insert("small", StatLine::new(0.3, 0.31, 0.41));
        table.insert("big", StatLine::new(0.3, 0.40, 0.50));
        lineup.bench = vec![
            Player::new("small", "P3").benched(),
            Player::new("big", "P3").benched(),
        ];

        let result = better_bench(&table, lineup);
        assert_eq!(result.lineup[3].name, "big");
        assert_eq!(result.lineup[3].defensive_position, "P3");
        assert_eq!(result.bench[1].name, "p3");
        assert_eq!(result.bench[1].defensive_position, BENCH_POSITION);
        assert_eq!(result.bench[0].name, "small");
    }

    #[test]
    fn test_better_bench_noop_below_margin() {
        let (mut table, mut lineup) = fixture(&[(0.3, 0.4); LINEUP_SIZE]);
        table.insert("marginal", StatLine::new(0.3, 0.31, 0.41));
        lineup.bench = vec![Player::new("marginal", "P0").benched()];
        assert_eq!(better_bench(&table, lineup.clone()), lineup);
    }

    #[test]
    fn test_wasted_obp_moves_power_behind_on_base() {
        // p0 gets on base, p1 cannot slug, p8 can.
        let mut rows = [(0.300, 0.400); LINEUP_SIZE];
        rows[0] = (0.420, 0.400);
        rows[1] = (0.300, 0.300);
        rows[8] = (0.300, 0.600);
        rows[2] = (0.400, 0.450);
        rows[3] = (0.400, 0.450);
        rows[4] = (0.400, 0.450);
        let (table, lineup) = fixture(&rows);

        let mut rng = StdRng::seed_from_u64(1);
        let result = wasted_obp(&table, lineup.clone(), &mut rng);
        assert_ne!(result, lineup);
        // Only slot 1 follows a top-4 OBP hitter with weak SLG.
        assert_ne!(result.lineup[1].name, "p1");
        let moved = result.lineup[1].name.as_str();
        assert!(["p0", "p2", "p3", "p4", "p5", "p6", "p7", "p8"].contains(&moved));
    }

    #[test]
    fn test_wasted_slg_moves_on_base_ahead_of_power() {
        // p5 slugs, p4 batting ahead cannot get on base.
        let mut rows = [(0.330, 0.300); LINEUP_SIZE];
        rows[5] = (0.330, 0.600);
        rows[4] = (0.250, 0.300);
        rows[0] = (0.330, 0.500);
        rows[1] = (0.330, 0.500);
        rows[2] = (0.330, 0.500);
        let (table, lineup) = fixture(&rows);

        let mut rng = StdRng::seed_from_u64(2);
        let result = wasted_slg(&table, lineup.clone(), &mut rng);
        // Only slot 4 precedes a top-4 SLG hitter with weak OBP.
        assert_ne!(result.lineup[4].name, "p4");
    }

    #[test]
    fn test_agents_noop_without_stats() {
        let (_, lineup) = fixture(&[(0.3, 0.3); LINEUP_SIZE]);
        let table = StatTable::new();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(wasted_obp(&table, lineup.clone(), &mut rng), lineup);
        assert_eq!(wasted_slg(&table, lineup.clone(), &mut rng), lineup);
        assert_eq!(better_bench(&table, lineup.clone()), lineup);
    }

    #[test]
    fn test_agents_noop_on_short_lineup() {
        let (table, lineup) = fixture(&[(0.4, 0.2); 5]);
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(wasted_obp(&table, lineup.clone(), &mut rng), lineup);
        assert_eq!(wasted_slg(&table, lineup.clone(), &mut rng), lineup);
    }

    #[test]
    fn test_register_all() {
        let mut engine = Engine::new(Default::default());
        register_lineup_agents(&mut engine, Arc::new(StatTable::new())).unwrap();
        let names: Vec<&str> = engine.agents().names().collect();
        assert_eq!(names, vec![SWAPPER, BETTER_BENCH, WASTED_OBP, WASTED_SLG]);
        assert!(names.iter().all(|n| engine.agents().arity(n) == Some(1)));
    }
}
