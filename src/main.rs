use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use trailhound::aws::{self, AwsOptions};
use trailhound::config::TrailhoundConfig;
use trailhound::detect::engine::{Analyzer, AnalyzerOptions};
use trailhound::detect::report::{format_finding, format_summary};
use trailhound::detect::AnalysisReport;
use trailhound::events::EventBatch;
use trailhound::ingest;

#[derive(Parser)]
#[command(
    name = "trailhound",
    about = "Detects assumed-role credentials used from unknown source addresses",
    version,
    long_about = None
)]
struct Cli {
    /// AWS access key (omit to use the default credential chain)
    #[arg(long, global = true)]
    access_key: Option<String>,

    /// AWS secret key
    #[arg(long, global = true)]
    secret_key: Option<String>,

    /// AWS session token
    #[arg(long, global = true)]
    session_token: Option<String>,

    /// AWS region (overrides the config file)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Log every AssumeRole event in full as it is processed
    #[arg(long, global = true)]
    show_assume_role: bool,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read events from CloudTrail and look for suspicious activity
    Cloud {
        /// Maximum number of online events to process
        #[arg(long)]
        max_events: Option<usize>,
    },

    /// Same as `cloud`, but reads events from local gzipped log files
    Logs {
        /// Folder of CloudTrail log files (walked recursively)
        #[arg(long)]
        folder: PathBuf,
    },

    /// Download all CloudTrail logs from an S3 bucket to a local folder
    Download {
        /// Source bucket name
        #[arg(long)]
        bucket: String,

        /// Destination folder
        #[arg(long, default_value = "logs")]
        folder: PathBuf,
    },

    /// Decode local gzipped logs into one pretty-printed JSON file
    Export {
        /// Folder of CloudTrail log files (walked recursively)
        #[arg(long)]
        folder: PathBuf,

        /// Output file
        #[arg(long, default_value = "events.json")]
        output: PathBuf,
    },

    /// Obtain temporary credentials via STS AssumeRole
    AssumeRole {
        /// ARN of the role to assume
        #[arg(long)]
        role_arn: String,

        /// Session name for the temporary identity
        #[arg(long, default_value = "trailhound")]
        session_name: String,

        /// Token duration in seconds
        #[arg(long, default_value = "900")]
        duration: i32,
    },
}

fn print_report(report: &AnalysisReport) {
    println!("{}", format_summary(report));
    for finding in &report.findings {
        println!("{}", format_finding(finding));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TrailhoundConfig::resolve(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let aws_options = AwsOptions {
        access_key: cli.access_key,
        secret_key: cli.secret_key,
        session_token: cli.session_token,
        region: cli.region.unwrap_or_else(|| config.aws.region.clone()),
    };
    let analyzer_options = AnalyzerOptions {
        verbose_assume_role: cli.show_assume_role,
    };

    match cli.command {
        Commands::Cloud { max_events } => {
            let max_events = max_events.unwrap_or(config.aws.max_events);
            tracing::info!(max_events, "reading events from CloudTrail");

            let sdk = aws::sdk_config(&aws_options).await;
            let mut batch = EventBatch::new();
            ingest::cloudtrail::fetch_events(&sdk, max_events, &mut batch).await?;

            let report = Analyzer::new(analyzer_options).analyze(batch);
            print_report(&report);
        }
        Commands::Logs { folder } => {
            tracing::info!(folder = %folder.display(), "reading events from local logs");

            let mut batch = EventBatch::new();
            let files = ingest::logs::load_folder(&folder, &mut batch)?;
            tracing::info!(files, events = batch.len(), "logs loaded");

            let report = Analyzer::new(analyzer_options).analyze(batch);
            print_report(&report);
        }
        Commands::Download { bucket, folder } => {
            tracing::info!(%bucket, folder = %folder.display(), "downloading bucket");

            let sdk = aws::sdk_config(&aws_options).await;
            let downloaded = ingest::s3::download_bucket(&sdk, &bucket, &folder).await?;
            println!("{} objects downloaded from '{}'", downloaded, bucket);
        }
        Commands::Export { folder, output } => {
            let count = ingest::dump::export_logs(&folder, &output)?;
            println!(
                "{} log files from '{}' saved to '{}'",
                count,
                folder.display(),
                output.display()
            );
        }
        Commands::AssumeRole {
            role_arn,
            session_name,
            duration,
        } => {
            let sdk = aws::sdk_config(&aws_options).await;
            let credentials = aws::assume_role(&sdk, &role_arn, &session_name, duration).await?;

            println!("Assumed role:      {}", credentials.assumed_role_arn);
            println!("Access key id:     {}", credentials.access_key_id);
            println!("Secret access key: {}", credentials.secret_access_key);
            println!("Session token:     {}", credentials.session_token);
            println!("Expires:           {}", credentials.expiration);
        }
    }

    Ok(())
}
