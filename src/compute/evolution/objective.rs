//! Objective registry: named, pure scoring functions over candidates.
//!
//! Objectives are evaluated in registration order. Each declares a
//! [`Direction`]; values are normalized to lower-is-better before they reach
//! the population, so dominance comparisons never mix conventions.

use std::fmt;

use crate::schema::{Direction, Score, ScoreVector};

use super::error::{BoxError, EvaluationError, RegistryError};

/// Scoring function signature.
pub type ObjectiveFn<C> = dyn Fn(&C) -> Result<f64, BoxError> + Send + Sync;

struct Objective<C> {
    name: String,
    direction: Direction,
    func: Box<ObjectiveFn<C>>,
}

/// Ordered set of objectives. Closed once the population holds a candidate.
pub struct ObjectiveRegistry<C> {
    objectives: Vec<Objective<C>>,
    closed: bool,
}

impl<C> Default for ObjectiveRegistry<C> {
    fn default() -> Self {
        Self {
            objectives: Vec::new(),
            closed: false,
        }
    }
}

impl<C> fmt::Debug for ObjectiveRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectiveRegistry")
            .field("objectives", &self.names().collect::<Vec<_>>())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<C> ObjectiveRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an objective.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&C) -> Result<f64, BoxError> + Send + Sync + 'static,
    {
        if self.closed {
            return Err(RegistryError::Closed);
        }
        let name = name.into();
        if self.objectives.iter().any(|o| o.name == name) {
            return Err(RegistryError::DuplicateName {
                kind: "Objective",
                name,
            });
        }
        self.objectives.push(Objective {
            name,
            direction,
            func: Box::new(func),
        });
        Ok(())
    }

    /// Reject further registrations.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Objective names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objectives.iter().map(|o| o.name.as_str())
    }

    /// Declared direction of an objective.
    pub fn direction(&self, name: &str) -> Option<Direction> {
        self.objectives
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.direction)
    }

    /// Evaluate every objective on `candidate`.
    ///
    /// Fails on the first objective that errors or yields a non-finite value.
    pub fn evaluate_all(&self, candidate: &C) -> Result<ScoreVector, EvaluationError> {
        let mut scores = Vec::with_capacity(self.objectives.len());
        for objective in &self.objectives {
            let raw = (objective.func)(candidate).map_err(|source| EvaluationError::Failed {
                objective: objective.name.clone(),
                source,
            })?;
            if !raw.is_finite() {
                return Err(EvaluationError::NonFinite {
                    objective: objective.name.clone(),
                    value: raw,
                });
            }
            scores.push(Score {
                objective: objective.name.clone(),
                value: objective.direction.normalize(raw),
            });
        }
        Ok(ScoreVector::new(scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ObjectiveRegistry<(f64, f64)> {
        let mut objectives = ObjectiveRegistry::new();
        objectives
            .register("x", Direction::Minimize, |c: &(f64, f64)| Ok(c.0))
            .unwrap();
        objectives
            .register("y", Direction::Maximize, |c: &(f64, f64)| Ok(c.1))
            .unwrap();
        objectives
    }

    #[test]
    fn test_evaluate_in_registration_order() {
        let scores = registry().evaluate_all(&(2.0, 3.0)).unwrap();
        let names: Vec<_> = scores.scores().iter().map(|s| s.objective.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(scores.get("x"), Some(2.0));
        // Maximized objectives are stored negated.
        assert_eq!(scores.get("y"), Some(-3.0));
    }

    #[test]
    fn test_duplicate_name() {
        let mut objectives = registry();
        let err = objectives
            .register("x", Direction::Minimize, |_: &(f64, f64)| Ok(0.0))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                kind: "Objective",
                name: "x".into()
            }
        );
        assert_eq!(objectives.len(), 2);
    }

    #[test]
    fn test_closed_registry() {
        let mut objectives = registry();
        objectives.close();
        let err = objectives
            .register("z", Direction::Minimize, |_: &(f64, f64)| Ok(0.0))
            .unwrap_err();
        assert_eq!(err, RegistryError::Closed);
    }

    #[test]
    fn test_failure_names_objective() {
        let mut objectives = registry();
        objectives
            .register("missing", Direction::Minimize, |_: &(f64, f64)| {
                Err("no data".into())
            })
            .unwrap();
        let err = objectives.evaluate_all(&(0.0, 0.0)).unwrap_err();
        assert_eq!(err.objective(), "missing");
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut objectives = ObjectiveRegistry::new();
        objectives
            .register("nan", Direction::Minimize, |_: &()| Ok(f64::NAN))
            .unwrap();
        let err = objectives.evaluate_all(&()).unwrap_err();
        assert!(matches!(err, EvaluationError::NonFinite { .. }));
    }
}
