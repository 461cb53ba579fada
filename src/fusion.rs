//! Risk fusion and trajectory projection
//!
//! Projects the heuristic CVD risk two years ahead using the short-horizon
//! trend features, and decides whether the combined picture warrants a
//! clinical follow-up alert.

use crate::risk::clamp_pct;
use crate::types::{EcgRhythm, FusionOutput, HrTrend, HrvBucket, RiskScores};

/// Uplift applied when a rising heart rate is corroborated by HRV or ECG
pub const TRAJECTORY_UPLIFT_PCT: f64 = 6.0;
/// Current risk at or above which an alert always triggers
pub const CURRENT_RISK_ALERT_PCT: f64 = 20.0;
/// Projected risk at or above which an alert triggers with elevated current risk
pub const TRAJECTORY_ALERT_PCT: f64 = 28.0;
/// Current risk required alongside a high projection
pub const ELEVATED_CURRENT_RISK_PCT: f64 = 18.0;

/// Advisory attached to every triggered fusion alert
pub const FOLLOW_UP_MESSAGE: &str = "Your cardiovascular risk indicators are elevated. \
Please schedule a follow-up with your doctor or a nurse visit for a clinical assessment.";

/// Combine risk estimates and trend features into a projection and alert
pub fn project_trajectory(
    risk: &RiskScores,
    hr_trend: Option<HrTrend>,
    hrv_bucket: Option<HrvBucket>,
    ecg_rhythm: EcgRhythm,
) -> FusionOutput {
    let current = risk.ml_cvd_risk_pct;
    let mut trajectory = current;

    let corroborated =
        hrv_bucket == Some(HrvBucket::Below) || ecg_rhythm == EcgRhythm::Irregular;
    if hr_trend == Some(HrTrend::Rising) && corroborated {
        trajectory = clamp_pct(trajectory + TRAJECTORY_UPLIFT_PCT);
    }

    let alert_triggered = current >= CURRENT_RISK_ALERT_PCT
        || (trajectory >= TRAJECTORY_ALERT_PCT && current >= ELEVATED_CURRENT_RISK_PCT);

    if alert_triggered {
        log::info!("Fusion alert: current {current}%, 2y trajectory {trajectory}%");
    }

    FusionOutput {
        trajectory_risk_2y_pct: trajectory,
        alert_triggered,
        alert_message: alert_triggered.then(|| FOLLOW_UP_MESSAGE.to_string()),
    }
}
