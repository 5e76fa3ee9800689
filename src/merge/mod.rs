//! Merge engine for a single pipeline pull request
//!
//! Two phases run in one linear flow:
//! 1. Readiness - fetch the PR and run ordered, short-circuiting checks
//! 2. Execute - merge, validate the result, delete the head branch
//!
//! Every platform call first takes a permit from the shared API limiter; the
//! merge call additionally takes a permit from the merge limiter.

mod execute;
mod readiness;

pub use execute::{MergeOptions, execute_merge};
pub use readiness::{
    READINESS_CHECKS, Readiness, ReadinessCheck, Verdict, check_build_status, check_mergeable,
    check_reviews, evaluate_readiness,
};

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::throttle::{RateLimiter, acquire_permit};
use crate::types::{MergeOutcome, MergeRequestInput, RepoId};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Borrowed collaborators for one merge invocation
///
/// Nothing here is owned: the platform client and both limiters belong to
/// the caller and outlive the invocation.
pub struct Invocation<'a> {
    /// Cancellation for every wait in this invocation
    pub cancel: &'a CancellationToken,
    /// What to merge
    pub input: &'a MergeRequestInput,
    /// Hosting platform
    pub platform: &'a dyn PlatformService,
    /// Limiter for every hosting API call
    pub api_limiter: &'a dyn RateLimiter,
    /// Limiter for merge submissions
    pub merge_limiter: &'a dyn RateLimiter,
    repo: RepoId,
}

impl<'a> Invocation<'a> {
    /// Bundle the collaborators for one invocation
    pub fn new(
        cancel: &'a CancellationToken,
        input: &'a MergeRequestInput,
        platform: &'a dyn PlatformService,
        api_limiter: &'a dyn RateLimiter,
        merge_limiter: &'a dyn RateLimiter,
    ) -> Self {
        Self {
            cancel,
            input,
            platform,
            api_limiter,
            merge_limiter,
            repo: input.repo_id(),
        }
    }

    /// Repository being merged into
    pub const fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Take one API permit, then run `call` unless cancelled
    pub(crate) async fn api_call<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        acquire_permit(self.api_limiter, self.cancel).await?;
        self.cancellable(call).await
    }

    /// Run `call`, abandoning it if the invocation is cancelled
    pub(crate) async fn cancellable<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            result = call => result,
        }
    }
}

/// Merge an open PR once it is ready
///
/// - `api_limiter` rate limits every call to the hosting API
/// - `merge_limiter` rate limits merges, to bound the load on CI
///
/// Returns `Ok` only when the PR is merged (now or by an earlier run) and,
/// if merged now, its head branch has been deleted. Use
/// [`MergeOutcome::from_result`] to turn any result into an outcome.
pub async fn merge_pull_request(
    cancel: &CancellationToken,
    input: &MergeRequestInput,
    platform: &dyn PlatformService,
    api_limiter: &dyn RateLimiter,
    merge_limiter: &dyn RateLimiter,
) -> Result<MergeOutcome> {
    merge_pull_request_with_options(
        cancel,
        input,
        platform,
        api_limiter,
        merge_limiter,
        &MergeOptions::default(),
    )
    .await
}

/// [`merge_pull_request`] with explicit options
#[instrument(
    skip_all,
    fields(org = %input.org, repo = %input.repo, pr = input.pr_number)
)]
pub async fn merge_pull_request_with_options(
    cancel: &CancellationToken,
    input: &MergeRequestInput,
    platform: &dyn PlatformService,
    api_limiter: &dyn RateLimiter,
    merge_limiter: &dyn RateLimiter,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    let invocation = Invocation::new(cancel, input, platform, api_limiter, merge_limiter);

    match evaluate_readiness(&invocation).await? {
        Readiness::AlreadyMerged { merge_commit_sha } => {
            info!(sha = ?merge_commit_sha, "PR already merged");
            Ok(MergeOutcome::already_merged(merge_commit_sha))
        }
        Readiness::Ready(pr) => execute_merge(&invocation, &pr, options).await,
    }
}
