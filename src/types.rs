//! Core types for the Pulse Sentinel engine
//!
//! This module defines the records that flow through each stage of an
//! evaluation: readings, contextual profiles, trend features, risk scores,
//! fusion output and the final analysis summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ECG rhythm classification reported by the wearable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcgRhythm {
    Regular,
    Irregular,
    #[default]
    Unknown,
}

impl EcgRhythm {
    pub fn as_str(&self) -> &'static str {
        match self {
            EcgRhythm::Regular => "regular",
            EcgRhythm::Irregular => "irregular",
            EcgRhythm::Unknown => "unknown",
        }
    }
}

/// Skin temperature trend classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureTrend {
    #[default]
    Normal,
    ElevatedSingleDay,
    #[serde(rename = "elevated_over_3_days")]
    ElevatedOver3Days,
}

impl TemperatureTrend {
    pub fn is_elevated(&self) -> bool {
        !matches!(self, TemperatureTrend::Normal)
    }
}

/// One timestamped biometric sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Measurement time (ordering key, not required unique)
    pub timestamp: DateTime<Utc>,
    /// Resting heart rate (bpm)
    pub heart_rate_resting: f64,
    /// Heart rate variability, RMSSD (ms)
    pub hrv_rmssd: f64,
    /// Blood oxygen saturation (%)
    pub spo2: f64,
    /// Respiratory rate (breaths per minute)
    pub respiratory_rate: f64,
    /// Skin temperature offset from personal norm (standardized)
    #[serde(default)]
    pub skin_temp_offset: f64,
    /// Steps in the reading window
    #[serde(default)]
    pub step_count: u32,
    /// Active calories in the reading window
    #[serde(default)]
    pub active_calories: f64,
    /// Sleep duration of the preceding night (hours)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_duration_hours: Option<f64>,
    #[serde(default)]
    pub ecg_rhythm: EcgRhythm,
    #[serde(default)]
    pub temperature_trend: TemperatureTrend,
}

/// Metrics the engine can compute baselines for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    HeartRateResting,
    HrvRmssd,
    Spo2,
    RespiratoryRate,
    StepCount,
    ActiveCalories,
    SleepDuration,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::HeartRateResting => "heart_rate_resting",
            Metric::HrvRmssd => "hrv_rmssd",
            Metric::Spo2 => "spo2",
            Metric::RespiratoryRate => "respiratory_rate",
            Metric::StepCount => "step_count",
            Metric::ActiveCalories => "active_calories",
            Metric::SleepDuration => "sleep_duration_hours",
        }
    }

    /// Numeric value of this metric in a reading, if present and finite
    pub fn value(&self, reading: &Reading) -> Option<f64> {
        let raw = match self {
            Metric::HeartRateResting => Some(reading.heart_rate_resting),
            Metric::HrvRmssd => Some(reading.hrv_rmssd),
            Metric::Spo2 => Some(reading.spo2),
            Metric::RespiratoryRate => Some(reading.respiratory_rate),
            Metric::StepCount => Some(reading.step_count as f64),
            Metric::ActiveCalories => Some(reading.active_calories),
            Metric::SleepDuration => reading.sleep_duration_hours,
        };
        raw.filter(|v| v.is_finite())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user static risk inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextProfile {
    /// Age in years (adults only)
    pub age: u32,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub hypertension: bool,
    /// Known total cholesterol (mmol/L), if measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
}

impl Default for ContextProfile {
    fn default() -> Self {
        Self {
            age: 50,
            smoker: false,
            hypertension: false,
            cholesterol: None,
        }
    }
}

/// Coarse alert level, ordered GREEN < YELLOW < RED
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Green,
    Yellow,
    Red,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Green => "GREEN",
            AlertLevel::Yellow => "YELLOW",
            AlertLevel::Red => "RED",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one reading against its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub alert_level: AlertLevel,
    /// Anomaly descriptions, or the gate reason for GREEN short-circuits
    pub anomalies: Vec<String>,
}

/// Personal baseline for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
    /// Number of samples in the rolling window (0 = neutral default)
    pub samples: usize,
}

impl Baseline {
    /// Neutral fallback used when no usable window exists
    pub const NEUTRAL: Baseline = Baseline {
        mean: 0.0,
        std: 1.0,
        samples: 0,
    };

    /// Whether this baseline was computed from real samples
    pub fn is_established(&self) -> bool {
        self.samples > 0
    }
}

/// Direction of the short-horizon heart rate trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrTrend {
    Rising,
    Stable,
    Declining,
}

/// Current HRV relative to its personal baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrvBucket {
    Below,
    At,
    Above,
}

/// Sleep duration classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPattern {
    Disrupted,
    Adequate,
    Good,
}

/// Short-horizon trend features derived from recent history
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendFeatures {
    pub hr_trend_2w: Option<HrTrend>,
    pub hrv_vs_baseline: Option<HrvBucket>,
    pub sleep_pattern: Option<SleepPattern>,
}

/// Output of a CVD risk estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvdRisk {
    /// Risk percentage (0-100)
    pub risk_pct: f64,
    /// Estimator confidence (0-1)
    pub confidence: f64,
}

/// Independent risk estimates, one per estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    pub framingham_10y_pct: f64,
    pub qrisk3_10y_pct: f64,
    pub ml_cvd_risk_pct: f64,
    pub ml_confidence: f64,
}

/// Fused 2-year projection and alert decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOutput {
    pub trajectory_risk_2y_pct: f64,
    pub alert_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_message: Option<String>,
}

/// Severity of an early warning sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

/// Precursor condition inferred from a combination of anomalies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyWarning {
    pub condition: String,
    pub severity: WarningSeverity,
    pub time_window: String,
}

/// Full analysis of one (user, reading) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analysis_id: String,
    pub user_id: String,
    pub processed_at: DateTime<Utc>,
    pub reading_timestamp: DateTime<Utc>,

    // Current metrics
    pub heart_rate_resting: f64,
    pub hrv_rmssd: f64,
    pub spo2: f64,
    pub respiratory_rate: f64,
    pub step_count: u32,
    pub sleep_duration_hours: Option<f64>,
    pub ecg_rhythm: EcgRhythm,
    pub temperature_trend: TemperatureTrend,

    // Personal baselines (None until a rolling window exists)
    pub hr_baseline: Option<f64>,
    pub hrv_baseline: Option<f64>,

    // Trend features
    pub hr_trend_2w: Option<HrTrend>,
    pub hrv_vs_baseline: Option<HrvBucket>,
    pub sleep_pattern: Option<SleepPattern>,

    pub risk_scores: RiskScores,
    /// Name of the estimator behind `ml_cvd_risk_pct`
    pub ml_estimator: String,
    pub fusion: FusionOutput,
    pub clinical_flags: Vec<String>,
    pub alert_level: AlertLevel,
    pub anomalies: Vec<String>,
    pub early_warnings: Vec<EarlyWarning>,
    pub recommendations: Vec<String>,
}

/// Status of a user's baseline calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineStatus {
    pub established: bool,
    pub days_until_baseline: u32,
    pub reading_count: usize,
}

/// Readiness label for the latest reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Stable,
    DeviationDetected,
}

/// Daily readiness score (0-100) for the latest stored reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessScore {
    pub user_id: String,
    pub score: u8,
    pub baseline_status: ReadinessStatus,
    pub trend: HrTrend,
}
