//! Readiness evaluation
//!
//! The verdict functions are pure and see only point-in-time snapshots, so
//! the check order and short-circuit policy can be tested without I/O.
//! [`evaluate_readiness`] is the effectful driver that fetches each snapshot
//! just before its check runs.

use crate::error::{Error, Result};
use crate::merge::Invocation;
use crate::types::{CombinedStatus, PullRequestSnapshot, Review, ReviewState};
use tracing::{debug, info};

/// Result of a single readiness check
#[derive(Debug)]
pub enum Verdict {
    /// Check passed (or was not enforced); move on to the next one
    Continue,
    /// Check failed; evaluation stops with this error
    Fail(Error),
}

impl Verdict {
    /// Whether the check passed
    pub const fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// One step of readiness evaluation, after the PR has been fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessCheck {
    /// Platform says the PR can be merged
    Mergeable,
    /// Combined status of the head commit (fetched, enforced on request)
    BuildStatus,
    /// Reviews on the PR (fetched, enforced on request)
    ReviewApproval,
}

impl std::fmt::Display for ReadinessCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mergeable => write!(f, "mergeable"),
            Self::BuildStatus => write!(f, "build status"),
            Self::ReviewApproval => write!(f, "review approval"),
        }
    }
}

/// Checks in evaluation order; the first failure ends evaluation
pub const READINESS_CHECKS: [ReadinessCheck; 3] = [
    ReadinessCheck::Mergeable,
    ReadinessCheck::BuildStatus,
    ReadinessCheck::ReviewApproval,
];

/// What readiness evaluation decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Nothing to do: an earlier run already merged the PR
    AlreadyMerged {
        /// Merge commit recorded by the platform
        merge_commit_sha: Option<String>,
    },
    /// Every check passed; carries the pre-merge PR snapshot
    Ready(PullRequestSnapshot),
}

/// The platform must report the PR as mergeable
///
/// An uncomputed mergeable flag counts as not mergeable.
pub fn check_mergeable(pr: &PullRequestSnapshot) -> Verdict {
    match pr.mergeable {
        Some(true) => Verdict::Continue,
        Some(false) if pr.is_draft => Verdict::Fail(Error::NotMergeable("PR is a draft".into())),
        Some(false) => Verdict::Fail(Error::NotMergeable(
            "platform reports conflicts or blocking rules".into(),
        )),
        None => Verdict::Fail(Error::NotMergeable(
            "mergeability not computed yet".into(),
        )),
    }
}

/// When `required`, the combined status must be exactly "success"
pub fn check_build_status(status: &CombinedStatus, required: bool) -> Verdict {
    if !required || status.is_success() {
        return Verdict::Continue;
    }
    Verdict::Fail(Error::BuildNotSuccessful {
        state: status.state.clone(),
    })
}

/// When `required`, there must be at least one review and every review must
/// be an approval. Reviews are scanned in order; the first non-approval wins.
pub fn check_reviews(reviews: &[Review], required: bool) -> Verdict {
    if !required {
        return Verdict::Continue;
    }
    if reviews.is_empty() {
        return Verdict::Fail(Error::AwaitingReview);
    }
    match reviews.iter().find(|r| r.state != ReviewState::Approved) {
        Some(review) => Verdict::Fail(Error::NotApproved {
            state: review.state.to_string(),
        }),
        None => Verdict::Continue,
    }
}

/// Fetch the PR and run [`READINESS_CHECKS`] in order
///
/// Each fetch consumes one API permit. Status and reviews are fetched even
/// when their check is not enforced, and a fetch error is fatal either way.
/// Never mutates anything on the platform.
pub async fn evaluate_readiness(inv: &Invocation<'_>) -> Result<Readiness> {
    let input = inv.input;
    let repo = inv.repo();

    let pr = inv
        .api_call(inv.platform.get_pull_request(repo, input.pr_number))
        .await?;

    if pr.merged {
        return Ok(Readiness::AlreadyMerged {
            merge_commit_sha: pr.merge_commit_sha,
        });
    }

    for check in READINESS_CHECKS {
        let verdict = match check {
            ReadinessCheck::Mergeable => check_mergeable(&pr),
            ReadinessCheck::BuildStatus => {
                let status = inv
                    .api_call(inv.platform.get_combined_status(repo, &input.commit_sha))
                    .await?;
                check_build_status(&status, input.require_build_success)
            }
            ReadinessCheck::ReviewApproval => {
                let reviews = inv
                    .api_call(inv.platform.list_reviews(repo, input.pr_number))
                    .await?;
                check_reviews(&reviews, input.require_review_approval)
            }
        };

        match verdict {
            Verdict::Continue => debug!(%check, "check passed"),
            Verdict::Fail(err) => {
                info!(%check, error = %err, "PR not ready");
                return Err(err);
            }
        }
    }

    Ok(Readiness::Ready(pr))
}
