//! Downloading CloudTrail log dumps from an S3 bucket.

use std::path::Path;

use anyhow::{Context, Result};
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use tracing::{error, info, warn};

/// Download every non-empty object from `bucket` into `folder`, mirroring
/// the object key layout. Returns the number of objects downloaded;
/// per-object failures are logged and skipped.
pub async fn download_bucket(config: &SdkConfig, bucket: &str, folder: &Path) -> Result<usize> {
    let client = Client::new(config);

    client
        .head_bucket()
        .bucket(bucket)
        .send()
        .await
        .with_context(|| format!("bucket '{}' not found or not accessible", bucket))?;

    info!(bucket, "loading logs");

    let mut continuation: Option<String> = None;
    let mut downloaded = 0;

    loop {
        let response = client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation.take())
            .send()
            .await
            .with_context(|| format!("failed to list objects in '{}'", bucket))?;

        for object in response.contents() {
            let Some(key) = object.key() else { continue };
            if object.size().unwrap_or(0) == 0 {
                info!(key, "skipping, either a folder or empty");
                continue;
            }
            if key.split('/').any(|segment| segment == "..") {
                warn!(key, "skipping object with path traversal in key");
                continue;
            }
            match download_object(&client, bucket, key, folder).await {
                Ok(bytes) => {
                    downloaded += 1;
                    info!(key, bytes, "downloaded");
                }
                Err(e) => error!(key, error = %e, "download failed"),
            }
        }

        continuation = response.next_continuation_token().map(str::to_string);
        if !response.is_truncated().unwrap_or(false) || continuation.is_none() {
            break;
        }
    }

    Ok(downloaded)
}

async fn download_object(client: &Client, bucket: &str, key: &str, folder: &Path) -> Result<u64> {
    let destination = folder.join(key);
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create '{}'", parent.display()))?;
    }

    let response = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("GetObject failed for '{}'", key))?;

    let data = response
        .body
        .collect()
        .await
        .with_context(|| format!("failed to read body of '{}'", key))?
        .into_bytes();

    tokio::fs::write(&destination, &data)
        .await
        .with_context(|| format!("failed to write '{}'", destination.display()))?;

    Ok(data.len() as u64)
}
