#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashSet, fmt::Display};

use serde::Serialize;

use crate::solution::Solution;

/// One exercise whose validation material is suppressed.
#[derive(Debug, Clone, Serialize)]
pub struct Skipped {
    /// Exercise name.
    pub name:     String,
    /// Week the exercise belongs to.
    pub week:     String,
    /// Sequence the exercise belongs to.
    pub sequence: String,
}

/// Summary of an extraction run, for the operator to eyeball.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    /// Every solution extracted, siblings included.
    pub total_solutions:    usize,
    /// Distinct exercise names.
    pub distinct_exercises: usize,
    /// Exercises tagged `no_validation`.
    pub skipped:            Vec<Skipped>,
}

impl Stats {
    /// Tallies a run's solutions (encounter order, siblings included).
    pub fn collect(solutions: &[Solution]) -> Self {
        let mut seen = HashSet::new();
        let mut skipped = Vec::new();
        for solution in solutions {
            if !seen.insert(solution.name.clone()) {
                continue;
            }
            if solution.no_validation {
                skipped.push(Skipped {
                    name:     solution.name.clone(),
                    week:     solution.week.clone(),
                    sequence: solution.sequence.clone(),
                });
            }
        }
        Stats {
            total_solutions:    solutions.len(),
            distinct_exercises: seen.len(),
            skipped,
        }
    }

    /// Logs the summary through the usual diagnostics stream.
    pub fn report(&self) {
        tracing::info!("{}", self);
        for skipped in &self.skipped {
            tracing::info!("skipped {} - w{}s{}", skipped.name, skipped.week, skipped.sequence);
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "We have a total of {} solutions for {} different exos - {} not validated",
            self.total_solutions,
            self.distinct_exercises,
            self.skipped.len()
        )
    }
}
