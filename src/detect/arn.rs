//! Canonical assumed-role ARN resolution.
//!
//! A role-assumption event is correlated with later activity through the ARN
//! of the temporary identity it produced. The response carries that ARN
//! verbatim; when only the request is available the ARN is synthesized from
//! the requested role and session name.

use crate::detect::DetectError;
use crate::events::Event;

/// Event name of a role-assumption call.
pub const ASSUME_ROLE_EVENT: &str = "AssumeRole";

/// Resolve the canonical ARN of the temporary identity produced by a
/// role-assumption event.
///
/// Returns `Ok(None)` when the event is not a role assumption, or when it
/// carries neither a response ARN nor a request role ARN. The
/// provider-confirmed response ARN always wins over synthesis.
pub fn resolve_assumed_role_arn(event: &Event) -> Result<Option<String>, DetectError> {
    if event.name != ASSUME_ROLE_EVENT {
        return Ok(None);
    }

    let response_arn = event.response_assumed_role_arn();
    if !response_arn.is_empty() {
        return Ok(Some(response_arn.to_string()));
    }

    let role_arn = event.role_arn();
    if role_arn.is_empty() {
        return Ok(None);
    }

    synthesize(role_arn, event.role_session_name()).map(Some)
}

/// Build `arn:<partition>:sts:<region>:<account>:assumed-role/<role>/<session>`
/// from a role ARN of the shape `arn:<partition>:iam:<region>:<account>:role/...`.
///
/// The role name is the final segment of the resource path; intermediate
/// path segments (path-qualified roles) do not appear in the assumed-role
/// ARN.
fn synthesize(role_arn: &str, session_name: &str) -> Result<String, DetectError> {
    let fields: Vec<&str> = role_arn.splitn(6, ':').collect();
    if fields.len() < 6 {
        return Err(DetectError::InvalidArnFormat {
            arn: role_arn.to_string(),
        });
    }

    let role_name = match fields[5].rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(DetectError::InvalidArnFormat {
                arn: role_arn.to_string(),
            })
        }
    };

    Ok(format!(
        "{}:{}:sts:{}:{}:assumed-role/{}/{}",
        fields[0], fields[1], fields[3], fields[4], role_name, session_name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AssumedRoleUser, RequestParameters, ResponseElements};

    fn assume_role_event() -> Event {
        Event {
            name: ASSUME_ROLE_EVENT.to_string(),
            ..Event::default()
        }
    }

    fn with_request(mut event: Event, role_arn: &str, session: &str) -> Event {
        event.request_parameters = Some(RequestParameters {
            role_arn: role_arn.to_string(),
            role_session_name: session.to_string(),
        });
        event
    }

    fn with_response(mut event: Event, arn: &str) -> Event {
        event.response_elements = Some(ResponseElements {
            assumed_role_user: AssumedRoleUser {
                arn: arn.to_string(),
                ..AssumedRoleUser::default()
            },
            ..ResponseElements::default()
        });
        event
    }

    #[test]
    fn test_non_assume_role_event_is_not_applicable() {
        let event = with_response(
            Event {
                name: "DescribeInstances".to_string(),
                ..Event::default()
            },
            "arn:aws:sts::789433625753:assumed-role/trailblazer/createsecuritygroup",
        );
        assert_eq!(resolve_assumed_role_arn(&event).unwrap(), None);
    }

    #[test]
    fn test_response_arn_is_authoritative() {
        let confirmed = "arn:aws:sts::789433625753:assumed-role/trailblazer/createsecuritygroup";
        // Request parameters would synthesize a different value; the
        // response must win unchanged.
        let event = with_request(
            with_response(assume_role_event(), confirmed),
            "arn:aws:iam::111111111111:role/Other",
            "othersession",
        );
        assert_eq!(
            resolve_assumed_role_arn(&event).unwrap().as_deref(),
            Some(confirmed)
        );
    }

    #[test]
    fn test_synthesis_round_trip() {
        let event = with_request(
            assume_role_event(),
            "arn:aws:iam::111111111111:role/Ops",
            "sess1",
        );
        assert_eq!(
            resolve_assumed_role_arn(&event).unwrap().as_deref(),
            Some("arn:aws:sts::111111111111:assumed-role/Ops/sess1")
        );
    }

    #[test]
    fn test_synthesis_uses_final_path_segment() {
        let event = with_request(
            assume_role_event(),
            "arn:aws:iam::111111111111:role/service/Ops",
            "sess1",
        );
        assert_eq!(
            resolve_assumed_role_arn(&event).unwrap().as_deref(),
            Some("arn:aws:sts::111111111111:assumed-role/Ops/sess1")
        );
    }

    #[test]
    fn test_neither_source_yields_none() {
        assert_eq!(resolve_assumed_role_arn(&assume_role_event()).unwrap(), None);
    }

    #[test]
    fn test_too_few_fields_is_invalid() {
        let event = with_request(assume_role_event(), "arn:aws:iam:role/Ops", "sess1");
        assert!(matches!(
            resolve_assumed_role_arn(&event),
            Err(DetectError::InvalidArnFormat { .. })
        ));
    }

    #[test]
    fn test_empty_resource_path_is_invalid() {
        for bad in ["arn:aws:iam::111111111111:", "arn:aws:iam::111111111111:role/"] {
            let event = with_request(assume_role_event(), bad, "sess1");
            assert!(
                matches!(
                    resolve_assumed_role_arn(&event),
                    Err(DetectError::InvalidArnFormat { .. })
                ),
                "expected InvalidArnFormat for '{}'",
                bad
            );
        }
    }
}
