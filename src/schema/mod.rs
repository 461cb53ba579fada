//! biometric.reading.v1 input schema
//!
//! This module defines the line-oriented input records consumed by the CLI:
//! one user reading per record, optionally carrying the user's contextual
//! profile, plus range validation for raw field values.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
