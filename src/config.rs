//! Engine configuration
//!
//! Thresholds for baseline windows, anomaly sigmas and the activity filter.
//! Defaults reproduce the clinical protocol; any field may be overridden from
//! JSON, missing fields keep their defaults.

use crate::error::SentinelError;
use serde::{Deserialize, Serialize};

/// Minimum history span (days) before anomaly scoring starts
pub const DEFAULT_MIN_BASELINE_DAYS: i64 = 14;
/// Leading days of history excluded from baselines
pub const DEFAULT_CALIBRATION_DAYS: i64 = 14;
/// Trailing window (days) used for the rolling baseline
pub const DEFAULT_ROLLING_WINDOW_DAYS: i64 = 7;
/// |z| above which a metric is anomalous
pub const DEFAULT_SIGMA_YELLOW: f64 = 1.5;
/// |z| above which an anomaly carries double weight
pub const DEFAULT_SIGMA_RED: f64 = 2.5;
/// Step-count percentile marking exercise context
pub const DEFAULT_ACTIVITY_PERCENTILE: f64 = 90.0;
/// Readings required before the activity filter applies
pub const DEFAULT_MIN_CONTEXT_READINGS: usize = 10;
/// Readings required before trend features are derived
pub const DEFAULT_MIN_TREND_HISTORY: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_baseline_days: i64,
    pub calibration_days: i64,
    pub rolling_window_days: i64,
    pub sigma_yellow: f64,
    pub sigma_red: f64,
    pub activity_percentile: f64,
    pub min_context_readings: usize,
    pub min_trend_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_baseline_days: DEFAULT_MIN_BASELINE_DAYS,
            calibration_days: DEFAULT_CALIBRATION_DAYS,
            rolling_window_days: DEFAULT_ROLLING_WINDOW_DAYS,
            sigma_yellow: DEFAULT_SIGMA_YELLOW,
            sigma_red: DEFAULT_SIGMA_RED,
            activity_percentile: DEFAULT_ACTIVITY_PERCENTILE,
            min_context_readings: DEFAULT_MIN_CONTEXT_READINGS,
            min_trend_history: DEFAULT_MIN_TREND_HISTORY,
        }
    }
}

impl EngineConfig {
    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<(), SentinelError> {
        if self.min_baseline_days < 0 || self.calibration_days < 0 {
            return Err(SentinelError::ConfigError(
                "baseline and calibration days must not be negative".to_string(),
            ));
        }
        if self.rolling_window_days <= 0 {
            return Err(SentinelError::ConfigError(
                "rolling_window_days must be positive".to_string(),
            ));
        }
        if !(self.sigma_yellow > 0.0 && self.sigma_red > self.sigma_yellow) {
            return Err(SentinelError::ConfigError(format!(
                "expected 0 < sigma_yellow < sigma_red, got {} and {}",
                self.sigma_yellow, self.sigma_red
            )));
        }
        if !(0.0..=100.0).contains(&self.activity_percentile) {
            return Err(SentinelError::ConfigError(format!(
                "activity_percentile must be within 0-100, got {}",
                self.activity_percentile
            )));
        }
        Ok(())
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SentinelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, SentinelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
