//! Trailhound -- CloudTrail assumed-role hijack detection.
//!
//! This crate provides the event model, the detection engine (canonical ARN
//! resolution, identity tracking, the analysis pass), and the thin
//! ingestion plumbing that feeds it from the CloudTrail API, local gzipped
//! log files, or S3 dumps.

pub mod aws;
pub mod config;
pub mod detect;
pub mod events;
pub mod ingest;
