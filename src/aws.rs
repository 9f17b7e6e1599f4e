//! Shared AWS SDK configuration and the STS assume-role utility.
//!
//! Credentials given on the command line become a static provider;
//! otherwise the SDK's default chain (environment, profile, instance
//! metadata) applies.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use tracing::info;

/// Connection options shared by every AWS-facing command.
#[derive(Debug, Clone, Default)]
pub struct AwsOptions {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub region: String,
}

/// Build the SDK configuration from the options.
pub async fn sdk_config(options: &AwsOptions) -> SdkConfig {
    info!(region = %options.region, "creating AWS session");

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(options.region.clone()));

    if let Some(access_key) = &options.access_key {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            options.secret_key.clone().unwrap_or_default(),
            options.session_token.clone(),
            None,
            "trailhound-cli",
        ));
    }

    loader.load().await
}

/// Temporary credentials acquired via STS, ready for display.
#[derive(Debug)]
pub struct AssumedCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
    pub assumed_role_arn: String,
}

/// Issue an STS `AssumeRole` call and return the temporary credentials.
///
/// Used to generate known-good role-assumption traffic against one's own
/// account, which the `cloud` and `logs` commands can then analyze.
pub async fn assume_role(
    config: &SdkConfig,
    role_arn: &str,
    session_name: &str,
    duration_seconds: i32,
) -> Result<AssumedCredentials> {
    let client = aws_sdk_sts::Client::new(config);

    let output = client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name)
        .duration_seconds(duration_seconds)
        .send()
        .await
        .with_context(|| format!("AssumeRole failed for '{}'", role_arn))?;

    let credentials = output
        .credentials()
        .context("AssumeRole response carried no credentials")?;
    let assumed_role_arn = output
        .assumed_role_user()
        .map_or(String::new(), |u| u.arn().to_string());

    info!(arn = %assumed_role_arn, "assumed role");

    Ok(AssumedCredentials {
        access_key_id: credentials.access_key_id().to_string(),
        secret_access_key: credentials.secret_access_key().to_string(),
        session_token: credentials.session_token().to_string(),
        expiration: credentials.expiration().to_string(),
        assumed_role_arn,
    })
}
