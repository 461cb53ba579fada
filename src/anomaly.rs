//! Anomaly detection
//!
//! Converts a reading into per-metric z-scores against the user's personal
//! baselines and folds the anomalous ones into a single alert level.
//!
//! Evaluation is a short-circuiting sequence of gates:
//! 1. history span below the minimum baseline period → GREEN
//! 2. exercise context → GREEN
//! 3. directional z-score scoring of the monitored metrics
//!
//! Anomalies are weighted (1 below the red sigma, 2 above) and the weights
//! summed; a single extreme metric stays YELLOW until a second metric
//! corroborates it.

use crate::baseline::BaselineCalculator;
use crate::config::{EngineConfig, DEFAULT_MIN_BASELINE_DAYS, DEFAULT_SIGMA_RED, DEFAULT_SIGMA_YELLOW};
use crate::context::ContextFilter;
use crate::types::{AlertLevel, Detection, Metric, Reading};
use chrono::Duration;

/// Reason reported while the baseline is still being established
pub const INSUFFICIENT_BASELINE_REASON: &str = "Insufficient baseline data";
/// Reason reported when exercise context suppresses scoring
pub const ACTIVITY_SUPPRESSED_REASON: &str = "Suppressed: High physical activity detected";

/// Score at or above which the alert level is RED
const RED_SCORE: u32 = 3;
/// Score at or above which the alert level is YELLOW
const YELLOW_SCORE: u32 = 1;

/// Which direction of deviation is clinically bad for a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadDirection {
    High,
    Low,
}

/// Metrics scored by the detector, with their bad direction
pub const MONITORED_METRICS: [(Metric, BadDirection); 4] = [
    (Metric::HeartRateResting, BadDirection::High),
    (Metric::HrvRmssd, BadDirection::Low),
    (Metric::Spo2, BadDirection::Low),
    (Metric::RespiratoryRate, BadDirection::High),
];

/// Map an accumulated deviation score to an alert level
pub fn alert_level_for_score(score: u32) -> AlertLevel {
    if score >= RED_SCORE {
        AlertLevel::Red
    } else if score >= YELLOW_SCORE {
        AlertLevel::Yellow
    } else {
        AlertLevel::Green
    }
}

/// Whether a history covers at least `min_days` between first and last reading
pub fn has_sufficient_history(history: &[Reading], min_days: i64) -> bool {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_days() >= min_days,
        _ => false,
    }
}

/// One-shot anomaly detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    min_baseline: Duration,
    sigma_yellow: f64,
    sigma_red: f64,
    baseline: BaselineCalculator,
    context: ContextFilter,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            min_baseline: Duration::days(DEFAULT_MIN_BASELINE_DAYS),
            sigma_yellow: DEFAULT_SIGMA_YELLOW,
            sigma_red: DEFAULT_SIGMA_RED,
            baseline: BaselineCalculator::default(),
            context: ContextFilter::default(),
        }
    }
}

impl AnomalyDetector {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_baseline: Duration::days(config.min_baseline_days),
            sigma_yellow: config.sigma_yellow,
            sigma_red: config.sigma_red,
            baseline: BaselineCalculator::from_config(config),
            context: ContextFilter::from_config(config),
        }
    }

    /// Evaluate `reading` against a history that already contains it
    pub fn evaluate(&self, reading: &Reading, history: &[Reading]) -> Detection {
        if !has_sufficient_history(history, self.min_baseline.num_days()) {
            log::debug!("Baseline not established ({} readings)", history.len());
            return Detection {
                alert_level: AlertLevel::Green,
                anomalies: vec![INSUFFICIENT_BASELINE_REASON.to_string()],
            };
        }

        if self.context.is_exercise_context(reading, history) {
            log::debug!("Reading at {} suppressed as exercise context", reading.timestamp);
            return Detection {
                alert_level: AlertLevel::Green,
                anomalies: vec![ACTIVITY_SUPPRESSED_REASON.to_string()],
            };
        }

        let mut anomalies = Vec::new();
        let mut deviation_score = 0;

        for (metric, direction) in MONITORED_METRICS {
            let Some(value) = metric.value(reading) else {
                continue;
            };
            let baseline = self.baseline.compute(history, metric);
            if baseline.std == 0.0 {
                continue;
            }

            let z = (value - baseline.mean) / baseline.std;
            let anomalous = match direction {
                BadDirection::High => z > self.sigma_yellow,
                BadDirection::Low => z < -self.sigma_yellow,
            };
            if !anomalous {
                continue;
            }

            anomalies.push(format!(
                "{metric} ({value:.1}) is {z:.1}σ from baseline ({:.1})",
                baseline.mean
            ));
            deviation_score += if z.abs() > self.sigma_red { 2 } else { 1 };
        }

        let alert_level = alert_level_for_score(deviation_score);
        if alert_level > AlertLevel::Green {
            log::info!(
                "Reading at {} escalated to {alert_level} (score {deviation_score}, {} anomalies)",
                reading.timestamp,
                anomalies.len()
            );
        }

        Detection {
            alert_level,
            anomalies,
        }
    }
}
