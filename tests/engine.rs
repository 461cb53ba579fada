use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use pulse_sentinel::anomaly::INSUFFICIENT_BASELINE_REASON;
use pulse_sentinel::fusion::FOLLOW_UP_MESSAGE;
use pulse_sentinel::types::{
    AlertLevel, BaselineStatus, ContextProfile, CvdRisk, EcgRhythm, HrTrend, ReadinessStatus,
    Reading, TemperatureTrend, WarningSeverity,
};
use pulse_sentinel::{
    CvdRiskEstimator, EarlyWarningEngine, EngineConfig, InMemoryStore, ReadingRecord,
    RecordAdapter, ReadingStore,
};
use std::sync::Arc;
use std::thread;

fn make_reading(hours: i64, hr: f64, hrv: f64) -> Reading {
    Reading {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 6, 30, 0).unwrap() + Duration::hours(hours),
        heart_rate_resting: hr,
        hrv_rmssd: hrv,
        spo2: 97.0,
        respiratory_rate: 14.0,
        skin_temp_offset: 0.0,
        step_count: 6000,
        active_calories: 250.0,
        sleep_duration_hours: Some(7.5),
        ecg_rhythm: EcgRhythm::Regular,
        temperature_trend: TemperatureTrend::Normal,
    }
}

/// 21 days of twice-daily readings alternating around HR 60 / HRV 50
fn seed<S: ReadingStore>(engine: &EarlyWarningEngine<S>, user_id: &str) {
    for i in 0..42 {
        let wiggle = if i % 2 == 0 { 1.0 } else { -1.0 };
        engine
            .ingest(user_id, make_reading(i * 12, 60.0 + wiggle, 50.0 - wiggle))
            .unwrap();
    }
}

struct FixedEstimator(f64);

impl CvdRiskEstimator for FixedEstimator {
    fn name(&self) -> &str {
        "fixed"
    }

    fn estimate(&self, _reading: &Reading, _profile: &ContextProfile) -> CvdRisk {
        CvdRisk {
            risk_pct: self.0,
            confidence: 0.5,
        }
    }
}

#[test]
fn test_cold_start_then_calibrated_detection() {
    let engine = EarlyWarningEngine::new(InMemoryStore::new());

    let first = engine.ingest("alice", make_reading(0, 60.0, 50.0)).unwrap();
    assert_eq!(first.alert_level, AlertLevel::Green);
    assert_eq!(first.anomalies, vec![INSUFFICIENT_BASELINE_REASON.to_string()]);
    assert_eq!(
        engine.baseline_status("alice").unwrap(),
        BaselineStatus {
            established: false,
            days_until_baseline: 14,
            reading_count: 1,
        }
    );

    let engine = EarlyWarningEngine::new(InMemoryStore::new());
    seed(&engine, "alice");
    assert!(engine.baseline_status("alice").unwrap().established);

    let detection = engine.ingest("alice", make_reading(21 * 24, 75.0, 50.0)).unwrap();
    assert_eq!(detection.alert_level, AlertLevel::Yellow);
    assert_eq!(detection.anomalies.len(), 1);
    assert!(detection.anomalies[0].starts_with("heart_rate_resting (75.0) is 3.5σ"));
}

#[test]
fn test_ingest_then_full_analysis() {
    let engine = EarlyWarningEngine::new(InMemoryStore::new());
    seed(&engine, "bob");

    let reading = make_reading(21 * 24, 75.0, 50.0);
    engine.ingest("bob", reading.clone()).unwrap();
    let summary = engine.full_analysis("bob", &reading, None).unwrap();

    assert_eq!(summary.user_id, "bob");
    assert_eq!(summary.reading_timestamp, reading.timestamp);
    assert_eq!(summary.alert_level, AlertLevel::Yellow);
    assert_eq!(summary.hr_baseline, Some(61.0));
    assert_eq!(summary.early_warnings.len(), 1);
    assert_eq!(summary.early_warnings[0].severity, WarningSeverity::Medium);
    assert!(!summary.fusion.alert_triggered);
    assert_eq!(engine.store().reading_count("bob"), 43);

    assert_eq!(summary.ml_estimator, "heuristic-cvd-v1");

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["alert_level"], "YELLOW");
}

#[test]
fn test_sustained_temperature_elevation_warns_of_infection() {
    let engine = EarlyWarningEngine::new(InMemoryStore::new());
    seed(&engine, "gina");

    let mut reading = make_reading(21 * 24, 60.0, 50.0);
    reading.temperature_trend = TemperatureTrend::ElevatedOver3Days;
    engine.ingest("gina", reading.clone()).unwrap();
    let summary = engine.full_analysis("gina", &reading, None).unwrap();

    assert_eq!(summary.alert_level, AlertLevel::Green);
    assert_eq!(summary.early_warnings.len(), 1);
    assert_eq!(summary.early_warnings[0].condition, "Possible infection");
    assert_eq!(summary.early_warnings[0].time_window, "Hours to days ahead");

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["temperature_trend"], "elevated_over_3_days");
}

#[test]
fn test_custom_estimator_drives_fusion_alert() {
    let engine =
        EarlyWarningEngine::new(InMemoryStore::new()).with_estimator(Box::new(FixedEstimator(25.0)));
    seed(&engine, "carol");

    let reading = engine.store().history("carol").unwrap().pop().unwrap();
    let summary = engine.full_analysis("carol", &reading, None).unwrap();

    assert_eq!(summary.risk_scores.ml_cvd_risk_pct, 25.0);
    assert_eq!(summary.ml_estimator, "fixed");
    assert_eq!(summary.fusion.trajectory_risk_2y_pct, 25.0);
    assert!(summary.fusion.alert_triggered);
    assert_eq!(summary.fusion.alert_message.as_deref(), Some(FOLLOW_UP_MESSAGE));
    assert_eq!(summary.recommendations[0], FOLLOW_UP_MESSAGE);
}

#[test]
fn test_readiness_reflects_latest_reading() {
    let engine = EarlyWarningEngine::new(InMemoryStore::new());
    assert_eq!(engine.readiness_score("dave").unwrap(), None);

    seed(&engine, "dave");
    let calm = engine.readiness_score("dave").unwrap().unwrap();
    assert_eq!(calm.score, 100);
    assert_eq!(calm.baseline_status, ReadinessStatus::Stable);

    engine.ingest("dave", make_reading(21 * 24, 75.0, 50.0)).unwrap();
    let strained = engine.readiness_score("dave").unwrap().unwrap();
    assert_eq!(strained.score, 85);
    assert_eq!(strained.baseline_status, ReadinessStatus::DeviationDetected);
    assert_eq!(strained.trend, HrTrend::Stable);
}

#[test]
fn test_custom_config_shortens_calibration() {
    let config = EngineConfig::from_json(r#"{"min_baseline_days": 3}"#).unwrap();
    let engine = EarlyWarningEngine::with_config(InMemoryStore::new(), config).unwrap();

    for day in 0..4 {
        engine.ingest("erin", make_reading(day * 24, 60.0, 50.0)).unwrap();
    }
    let status = engine.baseline_status("erin").unwrap();
    assert!(status.established);
    assert_eq!(status.days_until_baseline, 0);

    let invalid = EngineConfig {
        sigma_red: 1.0,
        ..Default::default()
    };
    assert!(EarlyWarningEngine::with_config(InMemoryStore::new(), invalid).is_err());
}

#[test]
fn test_records_feed_engine() {
    let ndjson = r#"
{"user_id":"frank","profile":{"age":61,"smoker":true},"reading":{"timestamp":"2024-03-04T06:30:00Z","heart_rate_resting":72,"hrv_rmssd":35,"spo2":96,"respiratory_rate":15}}
{"user_id":"frank","reading":{"timestamp":"2024-03-05T06:30:00Z","heart_rate_resting":71,"hrv_rmssd":36,"spo2":96,"respiratory_rate":15}}
"#;
    let records: Vec<ReadingRecord> = RecordAdapter::parse_ndjson(ndjson).unwrap();
    assert!(RecordAdapter::validate_records(&records).is_empty());

    let engine = EarlyWarningEngine::new(InMemoryStore::new());
    for record in &records {
        engine.ingest(&record.user_id, record.reading.clone()).unwrap();
        engine
            .full_analysis(&record.user_id, &record.reading, record.profile.clone())
            .unwrap();
    }

    let profile = engine.store().profile("frank").unwrap().unwrap();
    assert_eq!(profile.age, 61);
    assert!(profile.smoker);
}

#[test]
fn test_users_are_isolated_across_threads() {
    let engine = Arc::new(EarlyWarningEngine::new(InMemoryStore::new()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let user_id = format!("user-{t}");
                seed(engine.as_ref(), &user_id);
                engine.readiness_score(&user_id).unwrap().unwrap().score
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 100);
    }
    assert_eq!(engine.store().user_count(), 4);
    assert_eq!(engine.store().reading_count("user-2"), 42);
}
