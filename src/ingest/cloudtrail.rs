//! Online ingestion from the CloudTrail `LookupEvents` API.

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_cloudtrail::primitives::DateTime;
use chrono::Utc;
use tracing::{info, warn};

use crate::events::{Event, EventBatch};

const PAGE_SIZE: i32 = 50;

/// Page through `LookupEvents` up to `max_events`, decoding each raw event
/// document into the batch. Returns the number of events ingested; events
/// that fail to decode are logged and skipped.
pub async fn fetch_events(
    config: &SdkConfig,
    max_events: usize,
    batch: &mut EventBatch,
) -> Result<usize> {
    let client = aws_sdk_cloudtrail::Client::new(config);

    // Pin the window end so pagination is consistent across pages.
    let end_time = DateTime::from_secs(Utc::now().timestamp());

    let mut next_token: Option<String> = None;
    let mut total = 0;

    loop {
        let response = client
            .lookup_events()
            .max_results(PAGE_SIZE)
            .end_time(end_time)
            .set_next_token(next_token.take())
            .send()
            .await
            .context("CloudTrail LookupEvents failed")?;

        for raw in response.events() {
            if total >= max_events {
                break;
            }
            let Some(document) = raw.cloud_trail_event() else {
                continue;
            };
            match serde_json::from_str::<Event>(document) {
                Ok(event) => {
                    batch.add_event(event);
                    total += 1;
                }
                Err(e) => {
                    warn!(
                        event_id = raw.event_id().unwrap_or(""),
                        error = %e,
                        "failed to decode CloudTrail event"
                    );
                }
            }
        }
        info!(total, "read events");

        next_token = response.next_token().map(str::to_string);
        if next_token.is_none() || total >= max_events {
            break;
        }
    }

    Ok(total)
}
