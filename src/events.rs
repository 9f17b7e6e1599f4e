//! CloudTrail event model and the in-memory batch it accumulates into.
//!
//! Events arrive from the ingestion layer (`crate::ingest`) already decoded
//! from JSON. The batch is an explicit, caller-owned buffer: ingestion
//! appends, the analyzer sorts and consumes. No global state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The principal that performed an API call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub arn: String,
    #[serde(rename = "userName", default)]
    pub user_name: String,
}

/// Request parameters of an `AssumeRole` call. Other call types carry
/// different parameters; everything unknown is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestParameters {
    #[serde(rename = "roleArn", default)]
    pub role_arn: String,
    #[serde(rename = "roleSessionName", default)]
    pub role_session_name: String,
}

/// Temporary credentials echoed back in an `AssumeRole` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "accessKeyId", default)]
    pub access_key_id: String,
    #[serde(default)]
    pub expiration: String,
    #[serde(rename = "sessionToken", default)]
    pub session_token: String,
}

/// The temporary identity produced by a successful `AssumeRole` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssumedRoleUser {
    #[serde(rename = "assumedRoleId", default)]
    pub assumed_role_id: String,
    #[serde(default)]
    pub arn: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseElements {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(rename = "assumedRoleUser", default)]
    pub assumed_role_user: AssumedRoleUser,
}

/// A resource affected by an API call. Carried for reporting, not used by
/// detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "ARN", default)]
    pub arn: String,
    #[serde(rename = "accountId", default)]
    pub account_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One CloudTrail audit record.
///
/// `time` is the only field required at decode time; a record without a
/// parseable `eventTime` fails deserialization and never reaches the
/// analyzer. CloudTrail writes `null` for sections that do not apply to a
/// call, hence the `Option` wrappers around the nested structs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventSource", default)]
    pub source: String,
    #[serde(rename = "errorCode", default)]
    pub error_code: String,
    #[serde(rename = "eventName", default)]
    pub name: String,
    #[serde(rename = "userIdentity", default)]
    pub user_identity: Option<UserIdentity>,
    #[serde(rename = "sourceIPAddress", default)]
    pub source_ip_address: String,
    #[serde(rename = "userAgent", default)]
    pub user_agent: String,
    #[serde(rename = "eventTime")]
    pub time: DateTime<Utc>,
    #[serde(rename = "awsRegion", default)]
    pub region: String,
    #[serde(rename = "requestParameters", default)]
    pub request_parameters: Option<RequestParameters>,
    #[serde(rename = "responseElements", default)]
    pub response_elements: Option<ResponseElements>,
    #[serde(rename = "requestID", default)]
    pub request_id: String,
    #[serde(rename = "eventID", default)]
    pub id: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(rename = "eventType", default)]
    pub event_type: String,
    #[serde(rename = "recipientAccountId", default)]
    pub recipient_account_id: String,
}

impl Event {
    /// A non-empty `errorCode` means the call failed.
    pub fn has_error(&self) -> bool {
        !self.error_code.is_empty()
    }

    /// ARN of the identity that performed the call. Empty for anonymous or
    /// unauthenticated calls.
    pub fn actor_arn(&self) -> &str {
        self.user_identity.as_ref().map_or("", |u| u.arn.as_str())
    }

    pub fn actor_user_name(&self) -> &str {
        self.user_identity
            .as_ref()
            .map_or("", |u| u.user_name.as_str())
    }

    /// The role ARN requested by an `AssumeRole` call, if present.
    pub fn role_arn(&self) -> &str {
        self.request_parameters
            .as_ref()
            .map_or("", |p| p.role_arn.as_str())
    }

    pub fn role_session_name(&self) -> &str {
        self.request_parameters
            .as_ref()
            .map_or("", |p| p.role_session_name.as_str())
    }

    /// The provider-confirmed assumed-role ARN from a successful
    /// `AssumeRole` response, if present.
    pub fn response_assumed_role_arn(&self) -> &str {
        self.response_elements
            .as_ref()
            .map_or("", |r| r.assumed_role_user.arn.as_str())
    }

    /// Export the event as pretty-printed JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// The document shape of one CloudTrail log file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailLog {
    #[serde(rename = "Records", default)]
    pub records: Vec<Event>,
}

/// Append-only accumulation buffer for one analysis pass.
///
/// Ingestion (files, API pages) appends in whatever order the source
/// produces; `sort_by_time` is the barrier that must run before detection.
#[derive(Debug, Default)]
pub struct EventBatch {
    events: Vec<Event>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn add_log(&mut self, log: TrailLog) {
        self.events.extend(log.records);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Stable chronological sort. Events with equal timestamps keep their
    /// ingestion order.
    pub fn sort_by_time(&mut self) {
        self.events.sort_by_key(|e| e.time);
    }
}
