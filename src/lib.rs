//! Pulse Sentinel - Early-warning engine for wearable biometric streams
//!
//! Sentinel evaluates per-user wearable readings against a personal rolling
//! baseline and estimates longer-horizon cardiovascular risk: baseline
//! computation → exertion filtering → anomaly scoring → trend extraction →
//! risk estimation → trajectory fusion.
//!
//! ## Modules
//!
//! - **Detection**: [`baseline`], [`context`] and [`anomaly`] turn a reading into an alert level
//! - **Risk**: [`features`], [`risk`] and [`fusion`] project a 2-year cardiovascular trajectory
//! - **Orchestration**: [`engine`] sequences everything over a [`ReadingStore`]

pub mod anomaly;
pub mod baseline;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod features;
pub mod fusion;
pub mod risk;
pub mod schema;
pub mod store;
pub mod types;

pub use config::EngineConfig;
pub use engine::{early_warnings, EarlyWarningEngine};
pub use error::{SentinelError, StoreError};
pub use risk::{CvdRiskEstimator, HeuristicCvdEstimator};
pub use store::{InMemoryStore, ReadingStore};

// Schema exports
pub use schema::{ReadingRecord, RecordAdapter, SCHEMA_VERSION};

/// Sentinel version embedded in CLI output
pub const SENTINEL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "pulse-sentinel";
