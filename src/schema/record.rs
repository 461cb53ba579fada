//! biometric.reading.v1 record definition

use crate::types::{ContextProfile, Reading};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current schema version
pub const SCHEMA_VERSION: &str = "biometric.reading.v1";

/// Minimum adult age accepted in a profile
pub const MIN_PROFILE_AGE: u32 = 18;

/// Accepted range of a raw reading field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

/// Physiologically plausible ranges for raw fields
pub const FIELD_RANGES: [FieldRange; 6] = [
    FieldRange { field: "heart_rate_resting", min: 30.0, max: 200.0 },
    FieldRange { field: "hrv_rmssd", min: 0.0, max: 300.0 },
    FieldRange { field: "spo2", min: 50.0, max: 100.0 },
    FieldRange { field: "respiratory_rate", min: 4.0, max: 60.0 },
    FieldRange { field: "skin_temp_offset", min: -5.0, max: 5.0 },
    FieldRange { field: "sleep_duration_hours", min: 0.0, max: 24.0 },
];

/// One input record: a reading for a user, optionally with their profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ContextProfile>,
    pub reading: Reading,
}

impl ReadingRecord {
    pub fn new(user_id: impl Into<String>, reading: Reading) -> Self {
        Self {
            schema_version: Some(SCHEMA_VERSION.to_string()),
            user_id: user_id.into(),
            profile: None,
            reading,
        }
    }

    /// Check schema version, identifiers and raw value ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(version) = &self.schema_version {
            if version != SCHEMA_VERSION {
                return Err(ValidationError::InvalidSchemaVersion {
                    expected: SCHEMA_VERSION.to_string(),
                    actual: version.clone(),
                });
            }
        }

        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingUserId);
        }

        let r = &self.reading;
        let values = [
            Some(r.heart_rate_resting),
            Some(r.hrv_rmssd),
            Some(r.spo2),
            Some(r.respiratory_rate),
            Some(r.skin_temp_offset),
            r.sleep_duration_hours,
        ];
        for (range, value) in FIELD_RANGES.iter().zip(values) {
            let Some(value) = value else { continue };
            if !(value >= range.min && value <= range.max) {
                return Err(ValidationError::OutOfRange {
                    field: range.field,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if !(r.active_calories >= 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "active_calories",
                value: r.active_calories,
                min: 0.0,
                max: f64::INFINITY,
            });
        }

        if let Some(profile) = &self.profile {
            if profile.age < MIN_PROFILE_AGE {
                return Err(ValidationError::UnderageProfile(profile.age));
            }
        }

        Ok(())
    }
}

/// Validation errors for input records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Missing user_id")]
    MissingUserId,

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Profile age {0} is below the adult minimum")]
    UnderageProfile(u32),
}
