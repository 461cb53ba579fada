//! Cardiovascular risk estimators
//!
//! Three independent estimators, all pure functions of a contextual profile
//! and/or a reading:
//! - an adapted Framingham point score
//! - an adapted QRISK3, uplifting Framingham with wearable lifestyle signals
//! - a heuristic CVD estimator standing in for a trained model
//!
//! Percentages are clamped to 0-100 and rounded half away from zero to one
//! decimal; confidences are clamped to 0-1 and rounded to two decimals.
//! Estimator sums run in integer fixed point so decimal ties round exactly.

use crate::types::{ContextProfile, CvdRisk, EcgRhythm, Reading};

/// Fixed-point units per percentage point
pub const PCT_UNITS: i64 = 10_000;
/// Fixed-point units per confidence of 1.0
pub const CONFIDENCE_UNITS: i64 = 100_000;

/// Integer division rounding half away from zero
fn div_round(value: i64, unit: i64) -> i64 {
    let half = unit / 2;
    if value >= 0 {
        (value + half) / unit
    } else {
        (value - half) / unit
    }
}

/// Measurement in integer hundredths
fn hundredths(value: f64) -> i64 {
    (value * 100.0).round().clamp(-1.0e12, 1.0e12) as i64
}

/// Clamp fixed-point percentage units to 0-100 and round to one decimal
pub fn pct_from_units(units: i64) -> f64 {
    div_round(units.clamp(0, 100 * PCT_UNITS), PCT_UNITS / 10) as f64 / 10.0
}

/// Clamp to a percentage and round half away from zero to one decimal.
///
/// The value is first snapped to [`PCT_UNITS`] so binary representation
/// error in a sum such as 12.0 + 0.45 + 0.2 does not decide the tie.
pub fn clamp_pct(value: f64) -> f64 {
    let units = (value * PCT_UNITS as f64)
        .round()
        .clamp(0.0, (100 * PCT_UNITS) as f64);
    pct_from_units(units as i64)
}

/// Adapted Framingham integer point score
pub fn framingham_points(profile: &ContextProfile, reading: &Reading) -> u32 {
    let mut points = 0;

    if profile.age >= 30 {
        points += ((profile.age - 30) / 10).min(4);
    }

    let hr = reading.heart_rate_resting;
    if hr >= 90.0 {
        points += 2;
    } else if hr >= 80.0 {
        points += 1;
    }

    if profile.hypertension {
        points += 2;
    }
    if profile.smoker {
        points += 1;
    }

    points
}

/// Framingham risk in fixed-point units: 5% + 2.2% per point
fn framingham_units(profile: &ContextProfile, reading: &Reading) -> i64 {
    let points = framingham_points(profile, reading) as i64;
    5 * PCT_UNITS + 22 * points * PCT_UNITS / 10
}

/// Adapted Framingham 10-year risk (%)
pub fn framingham_risk(profile: &ContextProfile, reading: &Reading) -> f64 {
    pct_from_units(framingham_units(profile, reading))
}

/// Adapted QRISK3 10-year risk (%): Framingham plus lifestyle uplift
pub fn qrisk3_risk(profile: &ContextProfile, reading: &Reading) -> f64 {
    let mut units = framingham_units(profile, reading).min(100 * PCT_UNITS);

    let hrv = hundredths(reading.hrv_rmssd);
    if hrv > 0 && hrv < 2500 {
        units += 2 * PCT_UNITS;
    }
    if matches!(reading.sleep_duration_hours, Some(h) if h > 0.0 && h < 6.0) {
        units += 15 * PCT_UNITS / 10;
    }
    if reading.step_count > 0 && reading.step_count < 5000 {
        units += 15 * PCT_UNITS / 10;
    }

    pct_from_units(units)
}

/// A CVD risk estimator producing a risk percentage and a confidence.
///
/// Implement this to plug a trained model in place of the heuristic.
pub trait CvdRiskEstimator: Send + Sync {
    /// Estimator name for provenance
    fn name(&self) -> &str;

    fn estimate(&self, reading: &Reading, profile: &ContextProfile) -> CvdRisk;
}

/// Rule-based placeholder for a trained CVD model
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCvdEstimator;

impl HeuristicCvdEstimator {
    const BASE_RISK: i64 = 12 * PCT_UNITS;
    const BASE_CONFIDENCE: i64 = 75_000;
    const MAX_CONFIDENCE_BOOST: i64 = 15_000;
}

impl CvdRiskEstimator for HeuristicCvdEstimator {
    fn name(&self) -> &str {
        "heuristic-cvd-v1"
    }

    fn estimate(&self, reading: &Reading, _profile: &ContextProfile) -> CvdRisk {
        // Measurements in hundredths; risk in PCT_UNITS
        let hr = hundredths(reading.heart_rate_resting);
        let hrv = hundredths(reading.hrv_rmssd);
        let mut risk = Self::BASE_RISK;

        // 0.15% per bpm above 80
        if hr >= 8000 {
            risk += 15 * (hr - 8000);
        }
        // 0.2% per ms below 30
        if hrv > 0 && hrv < 3000 {
            risk += 20 * (3000 - hrv);
        }
        if matches!(reading.sleep_duration_hours, Some(h) if h > 0.0 && h < 6.0) {
            risk += 3 * PCT_UNITS;
        }
        if reading.ecg_rhythm == EcgRhythm::Irregular {
            risk += 6 * PCT_UNITS;
        }
        if reading.step_count > 0 && reading.step_count < 4000 {
            risk += 2 * PCT_UNITS;
        }

        // (hr + hrv) / 1000, in CONFIDENCE_UNITS
        let boost = (hr + hrv).min(Self::MAX_CONFIDENCE_BOOST);
        let confidence = (Self::BASE_CONFIDENCE + boost).clamp(0, CONFIDENCE_UNITS);

        CvdRisk {
            risk_pct: pct_from_units(risk),
            confidence: div_round(confidence, CONFIDENCE_UNITS / 100) as f64 / 100.0,
        }
    }
}
