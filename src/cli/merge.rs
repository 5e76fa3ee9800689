//! Merge command - merge one pipeline PR and report the outcome

use crate::cli::style::{Stylize, check, cross};
use anstream::eprintln;
use anyhow::{Context, Result};
use prmerge::auth::get_github_auth;
use prmerge::config::{ApiEndpoints, ThrottleConfig};
use prmerge::error::{Error, FailureKind};
use prmerge::merge::{MergeOptions, merge_pull_request_with_options};
use prmerge::platform::GitHubService;
use prmerge::throttle::IntervalLimiter;
use prmerge::types::{MergeOutcome, MergeRequestInput, MergeState};
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Inputs for the merge command, already parsed from the command line
#[derive(Debug, Clone)]
pub struct MergeArgs {
    /// JSON file holding a `MergeRequestInput`, instead of the flags below
    pub input_file: Option<PathBuf>,
    /// Organization
    pub org: Option<String>,
    /// Repository
    pub repo: Option<String>,
    /// PR number
    pub pr_number: Option<u64>,
    /// Head commit SHA
    pub commit_sha: Option<String>,
    /// Require all reviews approved
    pub require_review_approval: bool,
    /// Require combined status "success"
    pub require_build_success: bool,
    /// Permit intervals
    pub throttle: ThrottleConfig,
    /// Executor options
    pub options: MergeOptions,
}

/// Machine-readable report printed on stdout
#[derive(Debug, Serialize)]
struct MergeReport {
    #[serde(flatten)]
    outcome: MergeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl MergeArgs {
    fn load_input(&self) -> Result<MergeRequestInput> {
        if let Some(path) = &self.input_file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut input: MergeRequestInput = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            // Flags can only tighten what the file asks for
            input.require_review_approval |= self.require_review_approval;
            input.require_build_success |= self.require_build_success;
            return Ok(input);
        }

        Ok(MergeRequestInput {
            org: self.org.clone().context("--org is required")?,
            repo: self.repo.clone().context("--repo is required")?,
            pr_number: self.pr_number.context("--pr is required")?,
            commit_sha: self.commit_sha.clone().context("--sha is required")?,
            require_review_approval: self.require_review_approval,
            require_build_success: self.require_build_success,
        })
    }
}

/// Run the merge command
///
/// Returns whether the PR ended up merged and cleaned up. Ctrl-C cancels
/// the invocation.
pub async fn run_merge(args: MergeArgs) -> Result<bool> {
    let input = args.load_input()?;
    args.throttle.validate()?;

    let auth = get_github_auth()?;
    let endpoints = ApiEndpoints::from_env()?;
    debug!(base = %endpoints.base, "using API endpoints");
    let platform = GitHubService::new(&auth, endpoints)?;

    let api_limiter = IntervalLimiter::new(args.throttle.api_interval);
    let merge_limiter = IntervalLimiter::new(args.throttle.merge_interval);

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let result = merge_pull_request_with_options(
        &cancel,
        &input,
        &platform,
        &api_limiter,
        &merge_limiter,
        &args.options,
    )
    .await;

    print_summary(&input, &result);

    let outcome = MergeOutcome::from_result(&result);
    let success = outcome.success;
    let report = MergeReport {
        outcome,
        error: result.as_ref().err().map(ToString::to_string),
        retryable: result.as_ref().err().map(Error::is_retryable),
    };
    println!("{}", serde_json::to_string(&report)?);

    Ok(success)
}

/// Human-readable summary on stderr
fn print_summary(input: &MergeRequestInput, result: &prmerge::error::Result<MergeOutcome>) {
    let target = format!("{}/{}#{}", input.org, input.repo, input.pr_number);
    match result {
        Ok(outcome) => {
            let sha = outcome.merge_commit_sha.as_deref().unwrap_or("(no sha)");
            let verb = match outcome.state {
                MergeState::AlreadyMerged => "Already merged",
                _ => "Merged",
            };
            eprintln!(
                "{} {} {}: {}",
                check(),
                verb.success(),
                target.accent(),
                sha.accent()
            );
        }
        Err(err) => {
            let label = match err.kind() {
                FailureKind::NotReady => "Not ready",
                FailureKind::Rejected => "Merge rejected",
                FailureKind::Cleanup => "Merged, cleanup failed",
                FailureKind::Cancelled => "Cancelled",
                FailureKind::Infrastructure => "Failed",
            };
            if err.is_retryable() {
                eprintln!("{} {} {}", label.warn(), target.accent(), err.to_string().muted());
            } else {
                eprintln!("{} {} {}: {}", cross(), label.error(), target.accent(), err);
            }
        }
    }
}
