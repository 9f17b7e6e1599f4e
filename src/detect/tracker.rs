//! Identity tracker -- which source addresses each assumed-role identity
//! has been handed out to.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything known about one assumed-role identity within a pass.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityRecord {
    /// Session name from the role-assumption that created the record.
    pub session_name: String,
    /// The canonical assumed-role ARN, also the tracker key.
    pub canonical_arn: String,
    /// Source addresses observed handing this identity out. Never shrinks
    /// within a pass.
    pub known_addresses: HashSet<String>,
    /// Time of the most recent role-assumption for this identity.
    pub last_seen: DateTime<Utc>,
}

/// Mapping from canonical assumed-role ARN to its record.
///
/// Owned exclusively by one analysis pass; only the role-assumption branch
/// of the detector writes to it. State does not survive the pass.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    records: HashMap<String, IdentityRecord>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `canonical_arn` was handed out to `address` at `time`.
    ///
    /// Creates the record on first sight; otherwise adds the address (set
    /// semantics) and advances `last_seen`. The session name is fixed at
    /// creation and not overwritten on update.
    pub fn upsert(
        &mut self,
        canonical_arn: &str,
        session_name: &str,
        address: &str,
        time: DateTime<Utc>,
    ) {
        match self.records.get_mut(canonical_arn) {
            Some(record) => {
                record.known_addresses.insert(address.to_string());
                record.last_seen = time;
            }
            None => {
                self.records.insert(
                    canonical_arn.to_string(),
                    IdentityRecord {
                        session_name: session_name.to_string(),
                        canonical_arn: canonical_arn.to_string(),
                        known_addresses: HashSet::from([address.to_string()]),
                        last_seen: time,
                    },
                );
            }
        }
    }

    /// Read-only lookup, valid for any actor ARN.
    pub fn lookup(&self, arn: &str) -> Option<&IdentityRecord> {
        self.records.get(arn)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
