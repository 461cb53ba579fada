//! Analysis orchestration
//!
//! This module provides the public API of Pulse Sentinel. It sequences
//! anomaly detection, trend extraction, the risk estimators and fusion into
//! one summary per reading.
//!
//! # Ordering contract
//!
//! [`EarlyWarningEngine::ingest`] records a reading and evaluates it.
//! [`EarlyWarningEngine::full_analysis`] never records anything: it assumes
//! the reading has already been ingested and is the latest stored point.
//! Callers wanting a summary for a fresh reading call `ingest` first.

use crate::anomaly::{has_sufficient_history, AnomalyDetector};
use crate::baseline::BaselineCalculator;
use crate::config::EngineConfig;
use crate::error::SentinelError;
use crate::features::{heart_rate_trend, FeatureExtractor};
use crate::fusion::project_trajectory;
use crate::risk::{framingham_risk, qrisk3_risk, CvdRiskEstimator, HeuristicCvdEstimator};
use crate::store::ReadingStore;
use crate::types::{
    AlertLevel, AnalysisSummary, BaselineStatus, ContextProfile, Detection, EarlyWarning,
    EcgRhythm, HrTrend, HrvBucket, Metric, ReadinessScore, ReadinessStatus, Reading, RiskScores,
    TemperatureTrend, WarningSeverity,
};
use chrono::Utc;
use uuid::Uuid;

/// Resting HR reference used when no personal baseline exists
pub const FALLBACK_HR_BASELINE: f64 = 70.0;
/// Bpm above baseline that raises the resting HR flag
pub const HR_ELEVATION_MARGIN: f64 = 10.0;
/// Sleep below this many hours triggers sleep advice
pub const LOW_SLEEP_HOURS: f64 = 6.0;
/// Readiness points lost per anomaly
pub const READINESS_PENALTY: u32 = 15;

pub const FLAG_AFIB: &str = "Atrial fibrillation suspected";
pub const FLAG_LOW_HRV: &str = "HRV below threshold";
pub const FLAG_ELEVATED_HR: &str = "Resting HR above personal baseline";

pub const ADVICE_SLEEP: &str = "Aim for 7-9 hours of sleep; short sleep raises cardiovascular strain.";
pub const ADVICE_HRV: &str =
    "Your HRV is below your personal baseline. Prioritise rest, hydration and stress reduction.";
pub const ADVICE_ECG: &str =
    "An irregular heart rhythm was detected. Please book an ECG review with a clinician.";

/// Early-warning engine over an injected store
pub struct EarlyWarningEngine<S: ReadingStore> {
    store: S,
    config: EngineConfig,
    detector: AnomalyDetector,
    features: FeatureExtractor,
    baseline: BaselineCalculator,
    estimator: Box<dyn CvdRiskEstimator>,
}

impl<S: ReadingStore> EarlyWarningEngine<S> {
    /// Create an engine with default thresholds and the heuristic estimator
    pub fn new(store: S) -> Self {
        Self::build(store, EngineConfig::default())
    }

    /// Create an engine with custom thresholds
    pub fn with_config(store: S, config: EngineConfig) -> Result<Self, SentinelError> {
        config.validate()?;
        Ok(Self::build(store, config))
    }

    fn build(store: S, config: EngineConfig) -> Self {
        Self {
            detector: AnomalyDetector::from_config(&config),
            features: FeatureExtractor::from_config(&config),
            baseline: BaselineCalculator::from_config(&config),
            estimator: Box::new(HeuristicCvdEstimator),
            store,
            config,
        }
    }

    /// Replace the CVD risk estimator (e.g. with a trained model)
    pub fn with_estimator(mut self, estimator: Box<dyn CvdRiskEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Record a reading and evaluate it against the user's history
    pub fn ingest(&self, user_id: &str, reading: Reading) -> Result<Detection, SentinelError> {
        let history = self.store.append_and_snapshot(user_id, reading.clone())?;
        Ok(self.detector.evaluate(&reading, &history))
    }

    /// Produce the full analysis summary for a reading.
    ///
    /// Does not append `reading`; see the module-level ordering contract. A
    /// supplied profile replaces the stored one; with neither, the default
    /// profile is adopted and stored for future calls.
    pub fn full_analysis(
        &self,
        user_id: &str,
        reading: &Reading,
        profile: Option<ContextProfile>,
    ) -> Result<AnalysisSummary, SentinelError> {
        let profile = self.resolve_profile(user_id, profile)?;
        let history = self.store.history(user_id)?;

        let detection = self.detector.evaluate(reading, &history);
        let features = self.features.extract(reading, &history);

        let ml = self.estimator.estimate(reading, &profile);
        let risk_scores = RiskScores {
            framingham_10y_pct: framingham_risk(&profile, reading),
            qrisk3_10y_pct: qrisk3_risk(&profile, reading),
            ml_cvd_risk_pct: ml.risk_pct,
            ml_confidence: ml.confidence,
        };
        let fusion = project_trajectory(
            &risk_scores,
            features.hr_trend_2w,
            features.hrv_vs_baseline,
            reading.ecg_rhythm,
        );

        let hr_baseline = self.established_mean(&history, Metric::HeartRateResting);
        let hrv_baseline = self.established_mean(&history, Metric::HrvRmssd);

        let mut clinical_flags = Vec::new();
        if reading.ecg_rhythm == EcgRhythm::Irregular {
            clinical_flags.push(FLAG_AFIB.to_string());
        }
        if features.hrv_vs_baseline == Some(HrvBucket::Below) && hrv_baseline.is_some() {
            clinical_flags.push(FLAG_LOW_HRV.to_string());
        }
        let hr_reference = hr_baseline.unwrap_or(FALLBACK_HR_BASELINE);
        if reading.heart_rate_resting > hr_reference + HR_ELEVATION_MARGIN {
            clinical_flags.push(FLAG_ELEVATED_HR.to_string());
        }

        let mut recommendations = Vec::new();
        if let Some(message) = &fusion.alert_message {
            recommendations.push(message.clone());
        }
        if matches!(reading.sleep_duration_hours, Some(h) if h > 0.0 && h < LOW_SLEEP_HOURS) {
            recommendations.push(ADVICE_SLEEP.to_string());
        }
        if features.hrv_vs_baseline == Some(HrvBucket::Below) {
            recommendations.push(ADVICE_HRV.to_string());
        }
        if reading.ecg_rhythm == EcgRhythm::Irregular {
            recommendations.push(ADVICE_ECG.to_string());
        }

        let early_warnings = early_warnings(&detection.anomalies, reading.temperature_trend);

        Ok(AnalysisSummary {
            analysis_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            processed_at: Utc::now(),
            reading_timestamp: reading.timestamp,
            heart_rate_resting: reading.heart_rate_resting,
            hrv_rmssd: reading.hrv_rmssd,
            spo2: reading.spo2,
            respiratory_rate: reading.respiratory_rate,
            step_count: reading.step_count,
            sleep_duration_hours: reading.sleep_duration_hours,
            ecg_rhythm: reading.ecg_rhythm,
            temperature_trend: reading.temperature_trend,
            hr_baseline,
            hrv_baseline,
            hr_trend_2w: features.hr_trend_2w,
            hrv_vs_baseline: features.hrv_vs_baseline,
            sleep_pattern: features.sleep_pattern,
            risk_scores,
            ml_estimator: self.estimator.name().to_string(),
            fusion,
            clinical_flags,
            alert_level: detection.alert_level,
            anomalies: detection.anomalies,
            early_warnings,
            recommendations,
        })
    }

    /// Readiness score for the latest stored reading, re-evaluated in place
    pub fn readiness_score(&self, user_id: &str) -> Result<Option<ReadinessScore>, SentinelError> {
        let history = self.store.history(user_id)?;
        let Some(latest) = history.last() else {
            return Ok(None);
        };

        let detection = self.detector.evaluate(latest, &history);
        // Gate reasons are not deviations
        let deviations = if detection.alert_level == AlertLevel::Green {
            0
        } else {
            detection.anomalies.len() as u32
        };
        let score = 100u32.saturating_sub(deviations * READINESS_PENALTY) as u8;

        Ok(Some(ReadinessScore {
            user_id: user_id.to_string(),
            score,
            baseline_status: if deviations > 0 {
                ReadinessStatus::DeviationDetected
            } else {
                ReadinessStatus::Stable
            },
            trend: heart_rate_trend(&history).unwrap_or(HrTrend::Stable),
        }))
    }

    /// Calibration status of a user's baseline
    pub fn baseline_status(&self, user_id: &str) -> Result<BaselineStatus, SentinelError> {
        let history = self.store.history(user_id)?;
        let min_days = self.config.min_baseline_days;
        let established = has_sufficient_history(&history, min_days);

        let days_until_baseline = if established {
            0
        } else {
            let span = match (history.first(), history.last()) {
                (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_days(),
                _ => 0,
            };
            (min_days - span).max(0) as u32
        };

        Ok(BaselineStatus {
            established,
            days_until_baseline,
            reading_count: history.len(),
        })
    }

    fn resolve_profile(
        &self,
        user_id: &str,
        profile: Option<ContextProfile>,
    ) -> Result<ContextProfile, SentinelError> {
        if let Some(profile) = profile {
            self.store.set_profile(user_id, profile.clone())?;
            return Ok(profile);
        }
        if let Some(stored) = self.store.profile(user_id)? {
            return Ok(stored);
        }

        log::debug!("No profile for {user_id}, adopting defaults");
        let default = ContextProfile::default();
        self.store.set_profile(user_id, default.clone())?;
        Ok(default)
    }

    fn established_mean(&self, history: &[Reading], metric: Metric) -> Option<f64> {
        let baseline = self.baseline.compute(history, metric);
        baseline.is_established().then_some(baseline.mean)
    }
}

/// Precursor conditions suggested by combinations of anomalies and an
/// elevated temperature trend
pub fn early_warnings(anomalies: &[String], temperature_trend: TemperatureTrend) -> Vec<EarlyWarning> {
    let mentions = |metric: Metric| anomalies.iter().any(|a| a.starts_with(metric.as_str()));

    let hr = mentions(Metric::HeartRateResting);
    let hrv = mentions(Metric::HrvRmssd);
    let resp = mentions(Metric::RespiratoryRate);
    let spo2 = mentions(Metric::Spo2);

    let mut warnings = Vec::new();
    if hr && hrv {
        warnings.push(EarlyWarning {
            condition: "Cardiovascular event risk".to_string(),
            severity: WarningSeverity::High,
            time_window: "Days to weeks ahead".to_string(),
        });
    } else if hr || hrv {
        warnings.push(EarlyWarning {
            condition: "Cardiovascular stress".to_string(),
            severity: WarningSeverity::Medium,
            time_window: "Days to weeks ahead".to_string(),
        });
    }
    if resp && spo2 {
        warnings.push(EarlyWarning {
            condition: "Respiratory infection risk".to_string(),
            severity: WarningSeverity::Medium,
            time_window: "Days ahead".to_string(),
        });
    }
    if temperature_trend.is_elevated() {
        warnings.push(EarlyWarning {
            condition: "Possible infection".to_string(),
            severity: WarningSeverity::Medium,
            time_window: "Hours to days ahead".to_string(),
        });
    }
    warnings
}
