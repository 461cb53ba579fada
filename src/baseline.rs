//! Baseline calculation
//!
//! Personal (mean, std) baselines over a two-stage window: readings from the
//! calibration period at the start of a user's history are discarded, then
//! only the trailing rolling window ending at the latest reading is used.
//! Degenerate windows resolve to neutral values so z-scores stay finite.

use crate::config::{EngineConfig, DEFAULT_CALIBRATION_DAYS, DEFAULT_ROLLING_WINDOW_DAYS};
use crate::types::{Baseline, Metric, Reading};
use chrono::Duration;

/// Windowed baseline calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineCalculator {
    calibration: Duration,
    rolling_window: Duration,
}

impl Default for BaselineCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_DAYS, DEFAULT_ROLLING_WINDOW_DAYS)
    }
}

impl BaselineCalculator {
    /// Create a calculator with the given calibration and rolling windows (days)
    pub fn new(calibration_days: i64, rolling_window_days: i64) -> Self {
        Self {
            calibration: Duration::days(calibration_days),
            rolling_window: Duration::days(rolling_window_days),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.calibration_days, config.rolling_window_days)
    }

    /// Compute the baseline of `metric` over a time-ordered history
    pub fn compute(&self, history: &[Reading], metric: Metric) -> Baseline {
        let (first, last) = match (history.first(), history.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Baseline::NEUTRAL,
        };

        let cutoff = first.timestamp + self.calibration;
        let mut valid: Vec<&Reading> = history.iter().filter(|r| r.timestamp >= cutoff).collect();
        if valid.is_empty() {
            // Still calibrating: fall back to the whole history
            valid = history.iter().collect();
        }

        let window_start = last.timestamp - self.rolling_window;
        let values: Vec<f64> = valid
            .into_iter()
            .filter(|r| r.timestamp >= window_start)
            .filter_map(|r| metric.value(r))
            .collect();

        if values.is_empty() {
            log::debug!("No {metric} values in rolling window, using neutral baseline");
            return Baseline::NEUTRAL;
        }

        let mean = mean(&values);
        let std = match sample_std(&values, mean) {
            Some(std) if std > 0.0 && std.is_finite() => std,
            _ => 1.0,
        };

        Baseline {
            mean,
            std,
            samples: values.len(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); undefined below two samples
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EcgRhythm, TemperatureTrend};
    use chrono::{TimeZone, Utc};

    fn make_reading(day: i64, hr: f64) -> Reading {
        Reading {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap() + Duration::days(day),
            heart_rate_resting: hr,
            hrv_rmssd: 55.0,
            spo2: 98.0,
            respiratory_rate: 14.0,
            skin_temp_offset: 0.0,
            step_count: 6000,
            active_calories: 300.0,
            sleep_duration_hours: None,
            ecg_rhythm: EcgRhythm::Regular,
            temperature_trend: TemperatureTrend::Normal,
        }
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let baseline = BaselineCalculator::default().compute(&[], Metric::HeartRateResting);
        assert_eq!(baseline, Baseline::NEUTRAL);
        assert!(!baseline.is_established());
    }

    #[test]
    fn test_calibration_period_excluded() {
        // Days 0-13 at 90 bpm are calibration noise; days 14-20 settle at 60-66
        let mut history: Vec<Reading> = (0..14).map(|d| make_reading(d, 90.0)).collect();
        history.extend((14..21).map(|d| make_reading(d, 60.0 + (d - 14) as f64)));

        let baseline = BaselineCalculator::default().compute(&history, Metric::HeartRateResting);

        // Window is day 13..=20 but day 13 is still calibration
        assert_eq!(baseline.samples, 7);
        assert!((baseline.mean - 63.0).abs() < 1e-9);
        // Sample std of 60..=66
        let expected_std = (28.0_f64 / 6.0).sqrt();
        assert!((baseline.std - expected_std).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_window_drops_old_readings() {
        let mut history: Vec<Reading> = (0..20).map(|d| make_reading(d, 50.0)).collect();
        history.extend((20..30).map(|d| make_reading(d, 70.0 + (d % 2) as f64)));

        let baseline = BaselineCalculator::default().compute(&history, Metric::HeartRateResting);

        // Trailing 7 days ending day 29 span days 22..=29
        assert_eq!(baseline.samples, 8);
        assert!((baseline.mean - 70.5).abs() < 1e-9);
    }

    #[test]
    fn test_falls_back_to_full_history_during_calibration() {
        let history: Vec<Reading> = (0..5).map(|d| make_reading(d, 60.0 + d as f64)).collect();
        let baseline = BaselineCalculator::default().compute(&history, Metric::HeartRateResting);
        assert_eq!(baseline.samples, 5);
        assert!((baseline.mean - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_substitutes_unit_std() {
        let history: Vec<Reading> = (0..25).map(|d| make_reading(d, 62.0)).collect();
        let baseline = BaselineCalculator::default().compute(&history, Metric::HeartRateResting);
        assert_eq!(baseline.std, 1.0);
        assert!((baseline.mean - 62.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_substitutes_unit_std() {
        let history = vec![make_reading(0, 71.0)];
        let baseline = BaselineCalculator::default().compute(&history, Metric::HeartRateResting);
        assert_eq!(baseline.samples, 1);
        assert_eq!(baseline.std, 1.0);
        assert!(baseline.std.is_finite());
    }

    #[test]
    fn test_missing_metric_is_neutral() {
        let history: Vec<Reading> = (0..25).map(|d| make_reading(d, 62.0)).collect();
        let baseline = BaselineCalculator::default().compute(&history, Metric::SleepDuration);
        assert_eq!(baseline, Baseline::NEUTRAL);
    }

    #[test]
    fn test_custom_windows() {
        let history: Vec<Reading> = (0..10).map(|d| make_reading(d, d as f64)).collect();
        let calculator = BaselineCalculator::new(0, 2);
        let baseline = calculator.compute(&history, Metric::HeartRateResting);
        // Days 7, 8, 9
        assert_eq!(baseline.samples, 3);
        assert!((baseline.mean - 8.0).abs() < 1e-9);
    }
}
