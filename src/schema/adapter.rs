//! Parsing helpers for biometric.reading.v1 records

use crate::error::SentinelError;
use crate::schema::record::{ReadingRecord, ValidationError};

/// Adapter for parsing reading records from JSON and NDJSON
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON array of records
    pub fn parse_array(json: &str) -> Result<Vec<ReadingRecord>, SentinelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse NDJSON (one record per line, blank lines ignored)
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<ReadingRecord>, SentinelError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = serde_json::from_str::<ReadingRecord>(trimmed).map_err(|e| {
                SentinelError::ValidationError(format!("Failed to parse line {}: {}", line_num + 1, e))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Validate records, returning only the failures
    pub fn validate_records(records: &[ReadingRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    user_id: record.user_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A record that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub user_id: String,
    pub error: ValidationError,
}
