//! Hosting platform services
//!
//! The merge step only needs five operations from the hosting platform;
//! everything else about the platform stays behind this trait.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{CombinedStatus, MergeResult, PullRequestSnapshot, RepoId, Review};
use async_trait::async_trait;

/// Platform service trait for the merge step
///
/// Implementations must not retry internally; every error is surfaced to the
/// caller as-is.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a pull request by number
    async fn get_pull_request(&self, repo: &RepoId, pr_number: u64)
    -> Result<PullRequestSnapshot>;

    /// Fetch the combined build status of a commit
    async fn get_combined_status(&self, repo: &RepoId, sha: &str) -> Result<CombinedStatus>;

    /// List reviews on a pull request, oldest first
    async fn list_reviews(&self, repo: &RepoId, pr_number: u64) -> Result<Vec<Review>>;

    /// Merge a pull request with the platform's default title and message
    async fn merge_pull_request(&self, repo: &RepoId, pr_number: u64) -> Result<MergeResult>;

    /// Delete a git ref, given relative to `refs/` (e.g. `heads/feature`)
    ///
    /// Returns [`Error::RefNotFound`](crate::error::Error::RefNotFound) when
    /// the ref does not exist.
    async fn delete_ref(&self, repo: &RepoId, ref_name: &str) -> Result<()>;
}
