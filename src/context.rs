//! Exercise context filter
//!
//! Deviations recorded during physical exertion are expected, not
//! pre-symptomatic. A reading whose step count sits above the user's own
//! high-activity percentile is treated as exercise context and suppressed
//! from anomaly scoring.

use crate::config::{EngineConfig, DEFAULT_ACTIVITY_PERCENTILE, DEFAULT_MIN_CONTEXT_READINGS};
use crate::types::Reading;

/// Step-count based exercise context filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextFilter {
    min_readings: usize,
    percentile: f64,
}

impl Default for ContextFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTEXT_READINGS, DEFAULT_ACTIVITY_PERCENTILE)
    }
}

impl ContextFilter {
    /// Create a filter needing `min_readings` of history, suppressing above `percentile`
    pub fn new(min_readings: usize, percentile: f64) -> Self {
        Self {
            min_readings,
            percentile: percentile.clamp(0.0, 100.0),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.min_context_readings, config.activity_percentile)
    }

    /// Whether `reading` should be suppressed as exercise-induced.
    ///
    /// The history is taken as supplied; when called during ingestion it
    /// already contains the reading itself.
    pub fn is_exercise_context(&self, reading: &Reading, history: &[Reading]) -> bool {
        if history.len() < self.min_readings || history.is_empty() {
            return false;
        }

        let steps: Vec<f64> = history.iter().map(|r| r.step_count as f64).collect();
        let threshold = percentile(&steps, self.percentile);

        (reading.step_count as f64) > threshold
    }
}

/// Percentile with linear interpolation between closest ranks
///
/// `values` must be non-empty.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
