//! Assumed-role misuse detection -- canonical ARN resolution, identity
//! tracking, and the analysis pass.
//!
//! The detection rule: a role-assumption event records which source
//! addresses a temporary identity was handed out to; any later call by that
//! identity from an address not on record is suspicious. Known limitation,
//! kept on purpose: only role-assumption events extend the known set, so
//! re-assuming the role from a new address silently trusts it. The engine
//! tests pin that behavior down.

pub mod arn;
pub mod engine;
pub mod report;
pub mod tracker;

use serde::Serialize;
use thiserror::Error;

use crate::detect::tracker::IdentityRecord;
use crate::events::Event;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid role ARN format: '{arn}'")]
    InvalidArnFormat { arn: String },
}

/// One detected instance of an identity acting from an address that was not
/// in its known set at the time of the call.
///
/// Carries a snapshot of the record as it stood when the finding was made,
/// plus the offending event itself.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub record: IdentityRecord,
    pub event: Event,
}

/// Aggregate result of one analysis pass.
#[derive(Debug, Default, Serialize)]
pub struct AnalysisReport {
    /// Events ingested into the batch.
    pub total: usize,
    /// Events skipped because the call carried an error code.
    pub skipped: usize,
    /// Role-assumption events seen (error-free ones only).
    pub assume_role: usize,
    /// Findings emitted.
    pub suspicious: usize,
    /// Findings in detection (chronological) order.
    pub findings: Vec<Finding>,
}
