//! Event ingestion -- thin producers that feed the analyzer's batch.
//!
//! Each source (CloudTrail API, local gzipped log files, S3 dumps) only
//! decodes and appends; no detection logic lives here. Per-item failures
//! are logged and skipped, whole-source failures abort the command.

pub mod cloudtrail;
pub mod dump;
pub mod logs;
pub mod s3;
