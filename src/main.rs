//! prmerge - merge a pipeline pull request once it is ready
//!
//! CLI binary wrapping a single merge invocation.

use anyhow::Result;
use clap::Parser;
use prmerge::config::{DEFAULT_API_INTERVAL, DEFAULT_MERGE_INTERVAL, ThrottleConfig};
use prmerge::merge::MergeOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "prmerge")]
#[command(about = "Merge a pull request once it is mergeable, built and approved")]
#[command(version)]
struct Cli {
    /// JSON file with {org, repo, pr_number, commit_sha, ...}
    #[arg(long, conflicts_with_all = ["org", "repo", "pr", "sha"])]
    input: Option<PathBuf>,

    /// Organization that owns the repository
    #[arg(long, required_unless_present = "input")]
    org: Option<String>,

    /// Repository name
    #[arg(long, required_unless_present = "input")]
    repo: Option<String>,

    /// Pull request number
    #[arg(long, required_unless_present = "input")]
    pr: Option<u64>,

    /// Head commit SHA of the pull request
    #[arg(long, required_unless_present = "input")]
    sha: Option<String>,

    /// Require at least one review and every review to be an approval
    #[arg(long)]
    require_review_approval: bool,

    /// Require the combined build status to be "success"
    #[arg(long)]
    require_build_success: bool,

    /// Milliseconds between hosting API calls
    #[arg(long, default_value_t = duration_millis(DEFAULT_API_INTERVAL))]
    api_interval_ms: u64,

    /// Seconds between merge submissions
    #[arg(long, default_value_t = DEFAULT_MERGE_INTERVAL.as_secs())]
    merge_interval_secs: u64,

    /// Treat an already-deleted head branch as successful cleanup
    #[arg(long)]
    tolerate_missing_branch: bool,
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prmerge=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let args = cli::MergeArgs {
        input_file: cli.input,
        org: cli.org,
        repo: cli.repo,
        pr_number: cli.pr,
        commit_sha: cli.sha,
        require_review_approval: cli.require_review_approval,
        require_build_success: cli.require_build_success,
        throttle: ThrottleConfig {
            api_interval: Duration::from_millis(cli.api_interval_ms),
            merge_interval: Duration::from_secs(cli.merge_interval_secs),
        },
        options: MergeOptions {
            tolerate_missing_branch: cli.tolerate_missing_branch,
        },
    };

    if cli::run_merge(args).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
