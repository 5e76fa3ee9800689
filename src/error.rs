//! Error types for prmerge

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while merging a pull request
#[derive(Debug, Error)]
pub enum Error {
    /// GitHub API call failed (network, auth, 5xx, bad response)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure (used by non-GitHub implementations and fakes)
    #[error("platform error: {0}")]
    Platform(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid configuration (e.g. malformed base URL)
    #[error("configuration error: {0}")]
    Config(String),

    /// The invocation was cancelled while waiting on a permit or a platform call
    #[error("operation cancelled")]
    Cancelled,

    /// The platform reports the PR cannot be merged
    #[error("PR is not mergeable: {0}")]
    NotMergeable(String),

    /// Build status was required to be "success" but was something else
    #[error("status was not 'success', instead was '{state}'")]
    BuildNotSuccessful {
        /// Combined status state observed on the head commit
        state: String,
    },

    /// Review approval was required but the PR has no reviews
    #[error("PR awaiting review")]
    AwaitingReview,

    /// Review approval was required and a review is not an approval
    #[error("PR is not approved. Review state is {state}")]
    NotApproved {
        /// State of the first non-approving review
        state: String,
    },

    /// The merge call succeeded but the platform did not merge
    #[error("failed to merge: {message}")]
    MergeRejected {
        /// Explanation returned by the platform
        message: String,
    },

    /// A git ref that was expected to exist does not
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// The PR was merged but its head branch could not be deleted
    #[error("PR merged but failed to delete branch '{branch}': {source}")]
    BranchCleanup {
        /// Head branch that should have been deleted
        branch: String,
        /// SHA of the merge commit that was created
        merge_commit_sha: Option<String>,
        /// Underlying deletion failure
        #[source]
        source: Box<Error>,
    },

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Coarse classification of a failure, for callers deciding what to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A readiness precondition is not met yet; worth retrying later
    NotReady,
    /// The hosting platform or its transport failed
    Infrastructure,
    /// The platform accepted the merge call but refused to merge
    Rejected,
    /// The PR was merged but cleanup did not complete
    Cleanup,
    /// The caller cancelled the invocation
    Cancelled,
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NotMergeable(_)
            | Self::BuildNotSuccessful { .. }
            | Self::AwaitingReview
            | Self::NotApproved { .. } => FailureKind::NotReady,
            Self::MergeRejected { .. } => FailureKind::Rejected,
            Self::BranchCleanup { .. } => FailureKind::Cleanup,
            Self::Cancelled => FailureKind::Cancelled,
            Self::GitHubApi(_)
            | Self::Platform(_)
            | Self::Auth(_)
            | Self::Config(_)
            | Self::RefNotFound(_)
            | Self::Internal(_) => FailureKind::Infrastructure,
        }
    }

    /// Whether re-running the same invocation later may succeed without
    /// anyone fixing infrastructure first
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), FailureKind::NotReady | FailureKind::Rejected)
    }

    /// Whether the PR ended up merged despite this error
    pub const fn is_merged(&self) -> bool {
        matches!(self, Self::BranchCleanup { .. })
    }

    /// Merge commit SHA, if the PR was merged before this error occurred
    pub fn merge_commit_sha(&self) -> Option<&str> {
        match self {
            Self::BranchCleanup {
                merge_commit_sha, ..
            } => merge_commit_sha.as_deref(),
            _ => None,
        }
    }
}
