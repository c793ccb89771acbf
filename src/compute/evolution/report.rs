//! Run report: score table, Pareto front, best entry and score differences,
//! exported as JSON files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::schema::{PopulationEntry, RunSummary, ScoreDifference, ScoreRow, ScoreVector};

use super::engine::Engine;
use super::error::EvaluationError;

pub const SCORES_FILE: &str = "evolution_scores.json";
pub const FRONT_FILE: &str = "pareto_front.json";
pub const BEST_FILE: &str = "best_solution.json";
pub const DIFFERENCES_FILE: &str = "score_differences.json";

/// Host-side summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<C> {
    /// Every retained history entry, lowest penalty first.
    pub rows: Vec<ScoreRow>,
    /// Active set at the time of the report.
    pub front: Vec<PopulationEntry<C>>,
    pub best: Option<PopulationEntry<C>>,
    /// Per-objective change from the initial candidate to `best`.
    pub differences: Vec<ScoreDifference>,
    pub summary: Option<RunSummary>,
}

impl<C: Clone> RunReport<C> {
    /// Collect a report from the engine's population.
    pub fn from_engine(engine: &Engine<C>) -> Self {
        let population = engine.population();

        let mut rows: Vec<ScoreRow> = population
            .history()
            .map(|entry| ScoreRow {
                id: entry.id,
                generation: entry.generation,
                scores: entry.scores.clone(),
                penalty: entry.penalty,
            })
            .collect();
        rows.sort_by(|a, b| a.penalty.total_cmp(&b.penalty).then(a.id.cmp(&b.id)));

        Self {
            rows,
            front: population.active().cloned().collect(),
            best: population.best_by_penalty().cloned(),
            differences: Vec::new(),
            summary: None,
        }
    }

    /// Attach the run summary.
    pub fn with_summary(mut self, summary: RunSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Re-evaluate `initial` and record how far the best entry moved on
    /// each objective.
    pub fn with_initial(mut self, engine: &Engine<C>, initial: &C) -> Result<Self, EvaluationError> {
        let initial = engine.objectives().evaluate_all(initial)?;
        if let Some(best) = &self.best {
            self.differences = score_differences(&initial, &best.scores);
        }
        Ok(self)
    }
}

impl<C: Serialize> RunReport<C> {
    /// Write the report files into `dir`, creating it if needed.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> io::Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut paths = Vec::with_capacity(4);
        paths.push(write_json(dir.join(SCORES_FILE), &self.rows)?);
        paths.push(write_json(dir.join(FRONT_FILE), &self.front)?);
        paths.push(write_json(dir.join(BEST_FILE), &self.best)?);
        paths.push(write_json(dir.join(DIFFERENCES_FILE), &self.differences)?);
        Ok(paths)
    }
}

/// Objective-by-objective difference `final - initial`.
///
/// Objectives missing from `final_scores` are skipped.
pub fn score_differences(initial: &ScoreVector, final_scores: &ScoreVector) -> Vec<ScoreDifference> {
    initial
        .scores()
        .iter()
        .filter_map(|score| {
            let final_score = final_scores.get(&score.objective)?;
            Some(ScoreDifference {
                objective: score.objective.clone(),
                initial: score.value,
                final_score,
                difference: final_score - score.value,
            })
        })
        .collect()
}

fn write_json<T: Serialize + ?Sized>(path: PathBuf, value: &T) -> io::Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    Ok(path)
}
