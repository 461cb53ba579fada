//! Trend feature extraction
//!
//! This module derives short-horizon features from recent history:
//! - Heart rate 2-week trend (least-squares slope over sample index)
//! - HRV relative to its personal baseline
//! - Sleep duration bucket

use crate::baseline::BaselineCalculator;
use crate::config::{EngineConfig, DEFAULT_MIN_TREND_HISTORY};
use crate::types::{HrTrend, HrvBucket, Metric, Reading, SleepPattern, TrendFeatures};

/// Number of trailing readings used for the heart rate trend
pub const TREND_WINDOW: usize = 14;
/// Minimum points required to fit the heart rate slope
pub const MIN_TREND_POINTS: usize = 5;
/// Slope (bpm per reading) beyond which the trend is rising/declining
pub const TREND_SLOPE_THRESHOLD: f64 = 0.5;
/// Fraction of baseline std separating the HRV buckets
pub const HRV_BAND_SIGMA: f64 = 0.5;
/// Sleep below this many hours is disrupted
pub const DISRUPTED_SLEEP_HOURS: f64 = 5.5;
/// Sleep at or above this many hours is good
pub const GOOD_SLEEP_HOURS: f64 = 7.0;

/// Feature extractor for trend features
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    min_history: usize,
    baseline: BaselineCalculator,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            min_history: DEFAULT_MIN_TREND_HISTORY,
            baseline: BaselineCalculator::default(),
        }
    }
}

impl FeatureExtractor {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_history: config.min_trend_history,
            baseline: BaselineCalculator::from_config(config),
        }
    }

    /// Extract trend features; all absent when history is too short
    pub fn extract(&self, reading: &Reading, history: &[Reading]) -> TrendFeatures {
        if history.len() < self.min_history {
            return TrendFeatures::default();
        }

        TrendFeatures {
            hr_trend_2w: heart_rate_trend(history),
            hrv_vs_baseline: self.hrv_bucket(reading, history),
            sleep_pattern: sleep_pattern(reading.sleep_duration_hours),
        }
    }

    fn hrv_bucket(&self, reading: &Reading, history: &[Reading]) -> Option<HrvBucket> {
        let baseline = self.baseline.compute(history, Metric::HrvRmssd);
        if !(baseline.std > 0.0 && baseline.std.is_finite()) {
            return None;
        }

        let band = HRV_BAND_SIGMA * baseline.std;
        let hrv = reading.hrv_rmssd;
        Some(if hrv < baseline.mean - band {
            HrvBucket::Below
        } else if hrv > baseline.mean + band {
            HrvBucket::Above
        } else {
            HrvBucket::At
        })
    }
}

/// Classify the slope of resting heart rate over the trailing readings
pub fn heart_rate_trend(history: &[Reading]) -> Option<HrTrend> {
    let start = history.len().saturating_sub(TREND_WINDOW);
    let values: Vec<f64> = history[start..]
        .iter()
        .filter_map(|r| Metric::HeartRateResting.value(r))
        .collect();

    if values.len() < MIN_TREND_POINTS {
        return None;
    }

    let slope = linear_slope(&values);
    Some(if slope > TREND_SLOPE_THRESHOLD {
        HrTrend::Rising
    } else if slope < -TREND_SLOPE_THRESHOLD {
        HrTrend::Declining
    } else {
        HrTrend::Stable
    })
}

/// Ordinary least-squares slope of `values` against x = 0..n-1
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }

    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    num / den
}

/// Bucket a sleep duration (hours); absent when unset or zero
pub fn sleep_pattern(hours: Option<f64>) -> Option<SleepPattern> {
    match hours {
        Some(h) if h > 0.0 && h < DISRUPTED_SLEEP_HOURS => Some(SleepPattern::Disrupted),
        Some(h) if h >= GOOD_SLEEP_HOURS => Some(SleepPattern::Good),
        Some(h) if h > 0.0 => Some(SleepPattern::Adequate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EcgRhythm, TemperatureTrend};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn make_reading(day: i64, hr: f64, hrv: f64) -> Reading {
        Reading {
            timestamp: Utc.with_ymd_and_hms(2024, 2, 1, 7, 0, 0).unwrap() + Duration::days(day),
            heart_rate_resting: hr,
            hrv_rmssd: hrv,
            spo2: 97.0,
            respiratory_rate: 15.0,
            skin_temp_offset: 0.0,
            step_count: 7000,
            active_calories: 320.0,
            sleep_duration_hours: Some(7.2),
            ecg_rhythm: EcgRhythm::Regular,
            temperature_trend: TemperatureTrend::Normal,
        }
    }

    #[test]
    fn test_linear_slope() {
        assert!((linear_slope(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 1.0).abs() < 1e-9);
        assert!((linear_slope(&[10.0, 8.0, 6.0]) + 2.0).abs() < 1e-9);
        assert_eq!(linear_slope(&[3.0]), 0.0);
    }

    #[test]
    fn test_rising_heart_rate_trend() {
        let history: Vec<Reading> = (0..20).map(|d| make_reading(d, 60.0 + d as f64, 50.0)).collect();
        assert_eq!(heart_rate_trend(&history), Some(HrTrend::Rising));
    }

    #[test]
    fn test_trend_uses_trailing_window() {
        // Early decline followed by 14 flat readings
        let mut history: Vec<Reading> = (0..10).map(|d| make_reading(d, 90.0 - 3.0 * d as f64, 50.0)).collect();
        history.extend((10..24).map(|d| make_reading(d, 62.0, 50.0)));
        assert_eq!(heart_rate_trend(&history), Some(HrTrend::Stable));
    }

    #[test]
    fn test_declining_trend() {
        let history: Vec<Reading> = (0..8).map(|d| make_reading(d, 70.0 - d as f64, 50.0)).collect();
        assert_eq!(heart_rate_trend(&history), Some(HrTrend::Declining));
    }

    #[test]
    fn test_trend_needs_five_points() {
        let history: Vec<Reading> = (0..4).map(|d| make_reading(d, 60.0 + d as f64, 50.0)).collect();
        assert_eq!(heart_rate_trend(&history), None);
    }

    #[test]
    fn test_sleep_pattern_buckets() {
        assert_eq!(sleep_pattern(Some(4.5)), Some(SleepPattern::Disrupted));
        assert_eq!(sleep_pattern(Some(5.5)), Some(SleepPattern::Adequate));
        assert_eq!(sleep_pattern(Some(6.9)), Some(SleepPattern::Adequate));
        assert_eq!(sleep_pattern(Some(7.0)), Some(SleepPattern::Good));
        assert_eq!(sleep_pattern(Some(0.0)), None);
        assert_eq!(sleep_pattern(None), None);
    }

    #[test]
    fn test_short_history_yields_no_features() {
        let history: Vec<Reading> = (0..6).map(|d| make_reading(d, 60.0, 50.0)).collect();
        let features = FeatureExtractor::default().extract(&history[5], &history);
        assert_eq!(features, TrendFeatures::default());
    }

    #[test]
    fn test_hrv_buckets() {
        let history: Vec<Reading> = (0..10)
            .map(|d| make_reading(d, 60.0, if d % 2 == 0 { 48.0 } else { 52.0 }))
            .collect();
        let extractor = FeatureExtractor::default();

        let low = make_reading(10, 60.0, 40.0);
        assert_eq!(extractor.extract(&low, &history).hrv_vs_baseline, Some(HrvBucket::Below));

        let high = make_reading(10, 60.0, 60.0);
        assert_eq!(extractor.extract(&high, &history).hrv_vs_baseline, Some(HrvBucket::Above));

        let typical = make_reading(10, 60.0, 50.5);
        let features = extractor.extract(&typical, &history);
        assert_eq!(features.hrv_vs_baseline, Some(HrvBucket::At));
        assert_eq!(features.sleep_pattern, Some(SleepPattern::Good));
        assert_eq!(features.hr_trend_2w, Some(HrTrend::Stable));
    }
}
