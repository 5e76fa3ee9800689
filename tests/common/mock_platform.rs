//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use prmerge::error::{Error, Result};
use prmerge::platform::PlatformService;
use prmerge::types::{
    CombinedStatus, MergeResult, PullRequestSnapshot, RepoId, Review, ReviewState,
};
use std::sync::Mutex;

/// Which platform operation was called
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    GetPullRequest { repo: RepoId, pr_number: u64 },
    GetCombinedStatus { repo: RepoId, sha: String },
    ListReviews { repo: RepoId, pr_number: u64 },
    Merge { repo: RepoId, pr_number: u64 },
    DeleteRef { repo: RepoId, ref_name: String },
}

/// Error to inject for one operation
#[derive(Debug, Clone)]
pub enum Injected {
    /// `Error::Platform(msg)`
    Platform(String),
    /// `Error::RefNotFound(ref)`
    RefNotFound,
}

impl Injected {
    fn to_error(&self, ref_name: &str) -> Error {
        match self {
            Self::Platform(msg) => Error::Platform(msg.clone()),
            Self::RefNotFound => Error::RefNotFound(ref_name.to_string()),
        }
    }
}

/// Simple mock platform service for testing
///
/// Manually implements `PlatformService` with:
/// - configurable PR / status / reviews / merge responses
/// - call tracking, in order, for verification
/// - error injection for failure path testing
pub struct MockPlatformService {
    pull_request: Mutex<PullRequestSnapshot>,
    status: Mutex<CombinedStatus>,
    reviews: Mutex<Vec<Review>>,
    merge_result: Mutex<MergeResult>,
    calls: Mutex<Vec<PlatformCall>>,
    error_on_get_pr: Mutex<Option<Injected>>,
    error_on_status: Mutex<Option<Injected>>,
    error_on_reviews: Mutex<Option<Injected>>,
    error_on_merge: Mutex<Option<Injected>>,
    error_on_delete_ref: Mutex<Option<Injected>>,
}

impl MockPlatformService {
    /// A PR that passes every check and merges cleanly
    pub fn ready(head_ref: &str, merge_sha: &str) -> Self {
        Self {
            pull_request: Mutex::new(PullRequestSnapshot {
                number: 1,
                merged: false,
                mergeable: Some(true),
                merge_commit_sha: None,
                head_ref: head_ref.to_string(),
                is_draft: false,
            }),
            status: Mutex::new(CombinedStatus {
                state: "success".to_string(),
                total_count: 1,
            }),
            reviews: Mutex::new(vec![Review {
                id: 1,
                state: ReviewState::Approved,
            }]),
            merge_result: Mutex::new(MergeResult {
                merged: true,
                sha: Some(merge_sha.to_string()),
                message: Some("Pull Request successfully merged".to_string()),
            }),
            calls: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(None),
            error_on_status: Mutex::new(None),
            error_on_reviews: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            error_on_delete_ref: Mutex::new(None),
        }
    }

    // === Response configuration ===

    pub fn set_already_merged(&self, merge_commit_sha: &str) {
        let mut pr = self.pull_request.lock().unwrap();
        pr.merged = true;
        pr.mergeable = None;
        pr.merge_commit_sha = Some(merge_commit_sha.to_string());
    }

    pub fn set_mergeable(&self, mergeable: Option<bool>) {
        self.pull_request.lock().unwrap().mergeable = mergeable;
    }

    pub fn set_status(&self, state: &str) {
        self.status.lock().unwrap().state = state.to_string();
    }

    pub fn set_reviews(&self, states: &[&str]) {
        *self.reviews.lock().unwrap() = states
            .iter()
            .zip(1..)
            .map(|(s, id)| Review {
                id,
                state: ReviewState::from_api(s),
            })
            .collect();
    }

    pub fn set_merge_rejected(&self, message: &str) {
        *self.merge_result.lock().unwrap() = MergeResult {
            merged: false,
            sha: None,
            message: Some(message.to_string()),
        };
    }

    // === Error injection ===

    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(Injected::Platform(msg.to_string()));
    }

    pub fn fail_status(&self, msg: &str) {
        *self.error_on_status.lock().unwrap() = Some(Injected::Platform(msg.to_string()));
    }

    pub fn fail_reviews(&self, msg: &str) {
        *self.error_on_reviews.lock().unwrap() = Some(Injected::Platform(msg.to_string()));
    }

    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(Injected::Platform(msg.to_string()));
    }

    pub fn fail_delete_ref(&self, msg: &str) {
        *self.error_on_delete_ref.lock().unwrap() = Some(Injected::Platform(msg.to_string()));
    }

    pub fn delete_ref_not_found(&self) {
        *self.error_on_delete_ref.lock().unwrap() = Some(Injected::RefNotFound);
    }

    // === Call verification ===

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn merge_call_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::Merge { .. }))
    }

    pub fn delete_ref_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::DeleteRef { ref_name, .. } => Some(ref_name),
                _ => None,
            })
            .collect()
    }

    pub fn status_call_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::GetCombinedStatus { .. }))
    }

    pub fn review_call_count(&self) -> usize {
        self.count(|c| matches!(c, PlatformCall::ListReviews { .. }))
    }

    pub fn assert_merge_not_called(&self) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| matches!(c, PlatformCall::Merge { .. })),
            "Expected no merge call but got: {calls:?}"
        );
    }

    pub fn assert_delete_not_called(&self) {
        let calls = self.calls();
        assert!(
            !calls.iter().any(|c| matches!(c, PlatformCall::DeleteRef { .. })),
            "Expected no delete_ref call but got: {calls:?}"
        );
    }

    fn count(&self, pred: impl Fn(&PlatformCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pull_request(
        &self,
        repo: &RepoId,
        pr_number: u64,
    ) -> Result<PullRequestSnapshot> {
        self.record(PlatformCall::GetPullRequest {
            repo: repo.clone(),
            pr_number,
        });
        if let Some(injected) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(injected.to_error(""));
        }
        let mut pr = self.pull_request.lock().unwrap().clone();
        pr.number = pr_number;
        Ok(pr)
    }

    async fn get_combined_status(&self, repo: &RepoId, sha: &str) -> Result<CombinedStatus> {
        self.record(PlatformCall::GetCombinedStatus {
            repo: repo.clone(),
            sha: sha.to_string(),
        });
        if let Some(injected) = self.error_on_status.lock().unwrap().as_ref() {
            return Err(injected.to_error(""));
        }
        Ok(self.status.lock().unwrap().clone())
    }

    async fn list_reviews(&self, repo: &RepoId, pr_number: u64) -> Result<Vec<Review>> {
        self.record(PlatformCall::ListReviews {
            repo: repo.clone(),
            pr_number,
        });
        if let Some(injected) = self.error_on_reviews.lock().unwrap().as_ref() {
            return Err(injected.to_error(""));
        }
        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn merge_pull_request(&self, repo: &RepoId, pr_number: u64) -> Result<MergeResult> {
        self.record(PlatformCall::Merge {
            repo: repo.clone(),
            pr_number,
        });
        if let Some(injected) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(injected.to_error(""));
        }
        let result = self.merge_result.lock().unwrap().clone();
        if result.merged {
            // Platforms may rewrite the head ref once merged
            self.pull_request.lock().unwrap().head_ref = "rewritten-after-merge".to_string();
        }
        Ok(result)
    }

    async fn delete_ref(&self, repo: &RepoId, ref_name: &str) -> Result<()> {
        self.record(PlatformCall::DeleteRef {
            repo: repo.clone(),
            ref_name: ref_name.to_string(),
        });
        if let Some(injected) = self.error_on_delete_ref.lock().unwrap().as_ref() {
            return Err(injected.to_error(ref_name));
        }
        Ok(())
    }
}
