//! Core types for prmerge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Owner/name pair identifying a repository on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoId {
    /// Organization or user, e.g. "Clever"
    pub owner: String,
    /// Repository name, e.g. "microplane"
    pub repo: String,
}

impl RepoId {
    /// Create a new repo id
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Everything needed to merge one pull request
///
/// Produced by the upstream push step and immutable for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestInput {
    /// Organization on the hosting platform
    pub org: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    pub pr_number: u64,
    /// Head commit of the PR, used to look up the combined build status
    pub commit_sha: String,
    /// Require at least one review, and every review to be an approval
    #[serde(default)]
    pub require_review_approval: bool,
    /// Require the combined status of the head commit to be "success"
    #[serde(default)]
    pub require_build_success: bool,
}

impl MergeRequestInput {
    /// Repository this request targets
    pub fn repo_id(&self) -> RepoId {
        RepoId::new(&self.org, &self.repo)
    }
}

/// How an invocation resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeState {
    /// The PR was not merged
    NotMerged,
    /// The PR had already been merged before this invocation
    AlreadyMerged,
    /// This invocation merged the PR and deleted its head branch
    Merged,
    /// This invocation merged the PR but could not delete its head branch
    MergedCleanupFailed,
}

/// Result of one merge invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// The PR is merged and the operation completed
    pub success: bool,
    /// Merge commit SHA, when known
    pub merge_commit_sha: Option<String>,
    /// Finer-grained resolution
    pub state: MergeState,
}

impl MergeOutcome {
    /// PR was merged by an earlier run
    pub const fn already_merged(merge_commit_sha: Option<String>) -> Self {
        Self {
            success: true,
            merge_commit_sha,
            state: MergeState::AlreadyMerged,
        }
    }

    /// PR was merged and cleaned up by this run
    pub const fn merged(merge_commit_sha: Option<String>) -> Self {
        Self {
            success: true,
            merge_commit_sha,
            state: MergeState::Merged,
        }
    }

    /// Outcome describing a failed invocation
    ///
    /// A cleanup failure still reports the merge commit so callers can tell
    /// "merged but not cleaned up" apart from "not merged".
    pub fn failed(err: &Error) -> Self {
        let state = if err.is_merged() {
            MergeState::MergedCleanupFailed
        } else {
            MergeState::NotMerged
        };
        Self {
            success: false,
            merge_commit_sha: err.merge_commit_sha().map(ToString::to_string),
            state,
        }
    }

    /// Collapse an invocation result into a single outcome
    pub fn from_result(result: &Result<Self>) -> Self {
        match result {
            Ok(outcome) => outcome.clone(),
            Err(err) => Self::failed(err),
        }
    }
}

/// Point-in-time view of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    /// PR number
    pub number: u64,
    /// Whether the PR has been merged
    pub merged: bool,
    /// Whether the PR can be merged
    /// - `Some(true)` = mergeable
    /// - `Some(false)` = conflicts, draft, blocked
    /// - `None` = not computed yet
    pub mergeable: Option<bool>,
    /// Merge commit SHA recorded by the platform
    pub merge_commit_sha: Option<String>,
    /// Head branch name
    pub head_ref: String,
    /// Whether the PR is a draft
    pub is_draft: bool,
}

/// Aggregate build status of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// "success", "pending", "failure", ...
    pub state: String,
    /// Number of statuses that contributed
    #[serde(default)]
    pub total_count: u32,
}

impl CombinedStatus {
    /// State string the platform uses for a passing build
    pub const SUCCESS: &'static str = "success";

    /// Whether the aggregate state is "success"
    pub fn is_success(&self) -> bool {
        self.state == Self::SUCCESS
    }
}

/// Verdict recorded by a reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    /// Approved
    Approved,
    /// Changes requested
    ChangesRequested,
    /// Commented without a verdict
    Commented,
    /// Dismissed
    Dismissed,
    /// Not submitted yet
    Pending,
    /// Anything the platform adds later
    Other(String),
}

impl ReviewState {
    /// Parse the platform's upper-case spelling
    pub fn from_api(state: &str) -> Self {
        match state {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            "COMMENTED" => Self::Commented,
            "DISMISSED" => Self::Dismissed,
            "PENDING" => Self::Pending,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approved => write!(f, "APPROVED"),
            Self::ChangesRequested => write!(f, "CHANGES_REQUESTED"),
            Self::Commented => write!(f, "COMMENTED"),
            Self::Dismissed => write!(f, "DISMISSED"),
            Self::Pending => write!(f, "PENDING"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A single review on a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// Review verdict
    pub state: ReviewState,
}

/// Result of a merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Whether the merge was performed
    pub merged: bool,
    /// The SHA of the merge commit (if merged)
    pub sha: Option<String>,
    /// Message from the platform (especially on failure)
    pub message: Option<String>,
}
