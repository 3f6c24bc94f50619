//! Simulated prediction-deviation report.
//!
//! This is NOT a measurement. It draws a Bernoulli "prediction was right"
//! outcome per feedback item so the console has something to display.
//! All draws come from a seeded PCG stream so the report is reproducible.

use lingxi_model::INTERESTED;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

/// Chance that an "interested" item counts as correctly predicted.
const HIT_RATE_INTERESTED: f64 = 0.7;
/// Chance for any other feedback value.
const HIT_RATE_OTHER: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionDeviation {
    /// Always true: these figures are simulated.
    pub simulated: bool,
    pub total_predictions: usize,
    pub correct_predictions: usize,
    pub accuracy_rate: String,
    pub deviation_rate: String,
    pub avg_confidence_error: f64,
}

/// Deterministic source for the simulated report.
pub struct DeviationSimulator {
    inner: Pcg64Mcg,
}

impl DeviationSimulator {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Simulate a report for one feedback batch.
    pub fn simulate<'a>(
        &mut self,
        feedback: impl IntoIterator<Item = &'a str>,
    ) -> PredictionDeviation {
        let mut total = 0usize;
        let mut correct = 0usize;
        for value in feedback {
            total += 1;
            let hit_rate = if value == INTERESTED { HIT_RATE_INTERESTED } else { HIT_RATE_OTHER };
            if self.inner.gen::<f64>() < hit_rate {
                correct += 1;
            }
        }

        let (accuracy, deviation) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                correct as f64 / total as f64 * 100.0,
                (total - correct) as f64 / total as f64 * 100.0,
            )
        };
        let confidence_error = self.inner.gen_range(10.0..30.0_f64);

        PredictionDeviation {
            simulated: true,
            total_predictions: total,
            correct_predictions: correct,
            accuracy_rate: format!("{accuracy:.1}%"),
            deviation_rate: format!("{deviation:.1}%"),
            avg_confidence_error: (confidence_error * 10.0).round() / 10.0,
        }
    }
}
