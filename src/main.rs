//! Lineup Evo CLI - Evolve a batting order from JSON inputs.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use lineup_evo::{
    compute::evolution::{Engine, RunReport},
    compute::lineup::{StatLine, StatTable, register_lineup_agents, register_lineup_objectives},
    schema::{EngineConfig, GameContext, Lineup, Player, RunConfig},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PRINT_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example();
        return;
    }

    if args.len() < 4 {
        eprintln!(
            "Usage: {} <config.json> <lineup.json> <stats.json> [output_dir]",
            args[0]
        );
        eprintln!();
        eprintln!("Evolve a batting order against the lineup objectives.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Engine configuration (time limit, filter interval, seed)");
        eprintln!("  lineup.json  Initial lineup and bench");
        eprintln!("  stats.json   Player statistics keyed by name");
        eprintln!("  output_dir   Where to write the run report (default: results)");
        eprintln!();
        eprintln!("Example inputs are generated with --example flag.");
        std::process::exit(1);
    }

    let config: EngineConfig = load_json(Path::new(&args[1]), "config");
    let lineup: Lineup = load_json(Path::new(&args[2]), "lineup");
    let stats = StatTable::from_path(&args[3]).unwrap_or_else(|e| {
        eprintln!("Error loading stats: {}", e);
        std::process::exit(1);
    });
    let output_dir = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("results"));

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    println!("Lineup Evolution");
    println!("================");
    println!("Players: {} starting, {} on bench", lineup.lineup.len(), lineup.bench.len());
    println!("Stats: {} players", stats.len());
    println!("Time limit: {:.1}s", config.run.time_limit_secs);
    println!("Filter interval: {}", config.run.filter_interval);
    println!();

    let stats = Arc::new(stats);
    let run = config.run.clone();
    let mut engine = Engine::new(config);
    let setup = register_lineup_objectives(&mut engine, stats.clone())
        .and_then(|_| register_lineup_agents(&mut engine, stats));
    if let Err(e) = setup {
        eprintln!("Error registering lineup functions: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = engine.seed(lineup.clone()) {
        eprintln!("Error seeding population: {}", e);
        std::process::exit(1);
    }

    let handle = engine.start_with(run).unwrap_or_else(|e| {
        eprintln!("Error starting evolution: {}", e);
        std::process::exit(1);
    });

    println!("Running evolution...");
    let mut last_print = Instant::now();
    while !handle.is_finished() {
        thread::sleep(POLL_INTERVAL);
        if last_print.elapsed() < PRINT_INTERVAL {
            continue;
        }
        last_print = Instant::now();

        let status = handle.status();
        match status.best_penalty {
            Some(penalty) => println!(
                "  Generation {}: best penalty={:.3}, active={}, history={}, {:.1}s",
                status.generation,
                penalty,
                status.active_size,
                status.history_size,
                status.elapsed_secs
            ),
            None => println!("  Generation {}", status.generation),
        }
    }

    let finished = handle.join().unwrap_or_else(|e| {
        eprintln!("Evolution failed: {}", e);
        std::process::exit(1);
    });
    let summary = finished.summary;
    let engine = finished.engine;

    println!();
    println!("Stopped: {:?}", summary.stop_reason);
    println!(
        "Steps: {} ({} inserted, {} skipped, {} failed)",
        summary.generations, summary.insertions, summary.skipped_steps, summary.evaluation_failures
    );
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        summary.elapsed_seconds, summary.steps_per_second
    );
    println!();

    println!("Pareto front ({} lineups):", engine.population().active_len());
    for entry in engine.population().active() {
        println!("  {} {}", entry.id, entry.scores);
    }
    println!();

    if let Some(best) = engine.population().best_by_penalty() {
        println!("Best lineup (penalty {:.3}):", best.penalty);
        for (slot, player) in best.candidate.lineup.iter().enumerate() {
            println!(
                "  {}. {} ({})",
                slot + 1,
                player.name,
                player.defensive_position
            );
        }
        println!();
    }

    let report = RunReport::from_engine(&engine).with_summary(summary);
    let report = match report.clone().with_initial(&engine, &lineup) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Warning: could not score the initial lineup: {}", e);
            report
        }
    };
    if !report.differences.is_empty() {
        println!("Score changes from the initial lineup:");
    }
    for diff in &report.differences {
        println!(
            "  {:26} {:>8.3} -> {:>8.3} ({:+.3})",
            diff.objective, diff.initial, diff.final_score, diff.difference
        );
    }

    match report.save(&output_dir) {
        Ok(paths) => {
            println!();
            println!("Saved {} report files to {}", paths.len(), output_dir.display());
        }
        Err(e) => {
            eprintln!("Error saving report: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> T {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {} file: {}", what, e);
        std::process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {}", what, e);
        std::process::exit(1);
    })
}

fn print_json<T: Serialize>(title: &str, value: &T) {
    println!("{}", title);
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example: {}", e),
    }
    println!();
}

fn print_example() {
    let config = EngineConfig {
        run: RunConfig::new(Duration::from_secs(60), 50),
        random_seed: Some(42),
        ..Default::default()
    };

    let rows = [
        ("Leadoff", "CF", 0.285, 0.365, 0.420),
        ("Contact", "2B", 0.300, 0.350, 0.440),
        ("Slugger", "1B", 0.270, 0.360, 0.560),
        ("Cleanup", "RF", 0.265, 0.340, 0.520),
        ("Gap", "3B", 0.260, 0.325, 0.450),
        ("Steady", "LF", 0.255, 0.320, 0.410),
        ("Glove", "SS", 0.240, 0.300, 0.360),
        ("Catcher", "C", 0.230, 0.295, 0.380),
        ("Utility", "DH", 0.250, 0.310, 0.430),
    ];
    let mut stats = StatTable::new();
    let mut starters = Vec::new();
    for (name, position, avg, obp, slg) in rows {
        stats.insert(name, StatLine::new(avg, obp, slg));
        starters.push(Player::new(name, position));
    }
    stats.insert("Bench Bat", StatLine::new(0.275, 0.345, 0.470));
    let bench = vec![Player::new("Bench Bat", "LF").benched()];

    let lineup = Lineup::new(starters, bench).with_context(GameContext {
        opposing_pitcher: Some("Opponent Ace".to_string()),
        pitcher_throws: Some("R".to_string()),
        ..Default::default()
    });

    print_json("Example configuration (config.json):", &config);
    print_json("Example lineup (lineup.json):", &lineup);
    print_json("Example stats (stats.json):", &stats);
}
