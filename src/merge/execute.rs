//! Merge execution - the irreversible part
//!
//! Only reached after every readiness check passed. Takes the scarce merge
//! permit, merges, and deletes the head branch observed before the merge.

use crate::error::{Error, Result};
use crate::merge::Invocation;
use crate::throttle::acquire_permit;
use crate::types::{MergeOutcome, PullRequestSnapshot};
use tracing::{info, warn};

/// Options for the merge executor
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Treat an already-deleted head branch as a successful cleanup
    ///
    /// Off by default: a missing branch after merge is reported as a
    /// cleanup failure. Only GitHub's explicit "Reference does not exist"
    /// answer counts as missing; a 404 (also returned when the token cannot
    /// see the repository) is still a cleanup failure.
    pub tolerate_missing_branch: bool,
}

/// Merge the PR and delete its head branch (EFFECTFUL)
///
/// `pr` must be the snapshot fetched before the merge; its head ref is the
/// branch that gets deleted.
pub async fn execute_merge(
    inv: &Invocation<'_>,
    pr: &PullRequestSnapshot,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    let repo = inv.repo();
    let pr_number = inv.input.pr_number;

    // Merge permit first: it is the scarcer one
    acquire_permit(inv.merge_limiter, inv.cancel).await?;
    let result = inv
        .api_call(inv.platform.merge_pull_request(repo, pr_number))
        .await?;

    if !result.merged {
        let message = result
            .message
            .unwrap_or_else(|| "platform did not merge the PR".to_string());
        warn!(pr_number, %message, "merge rejected");
        return Err(Error::MergeRejected { message });
    }
    info!(pr_number, sha = ?result.sha, "merged PR");

    let branch = pr.head_ref.clone();
    let ref_name = format!("heads/{branch}");
    match inv
        .api_call(inv.platform.delete_ref(repo, &ref_name))
        .await
    {
        Ok(()) => info!(%branch, "deleted head branch"),
        Err(Error::RefNotFound(_)) if options.tolerate_missing_branch => {
            info!(%branch, "head branch already gone");
        }
        Err(err) => {
            warn!(%branch, error = %err, "merged but failed to delete head branch");
            return Err(Error::BranchCleanup {
                branch,
                merge_commit_sha: result.sha,
                source: Box::new(err),
            });
        }
    }

    Ok(MergeOutcome::merged(result.sha))
}
