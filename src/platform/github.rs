//! GitHub platform service implementation

use crate::auth::GitHubAuthConfig;
use crate::config::ApiEndpoints;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CombinedStatus, MergeResult, PullRequestSnapshot, RepoId, Review, ReviewState,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::pulls::ReviewState as OctoReviewState;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// GitHub rejects deletion of a missing ref with 422 and this message
const MISSING_REF_MESSAGE: &str = "Reference does not exist";

/// GitHub service using octocrab
///
/// Not bound to a single repository, so one service (and one connection
/// pool) can be shared by every concurrent merge.
pub struct GitHubService {
    client: Octocrab,
    endpoints: ApiEndpoints,
    /// Token for raw HTTP requests (combined status, ref deletion)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
}

impl GitHubService {
    /// Create a new GitHub service against the given endpoints
    pub fn new(auth: &GitHubAuthConfig, endpoints: ApiEndpoints) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(auth.token.clone());

        if !endpoints.is_default() {
            builder = builder
                .base_uri(endpoints.base.as_str())
                .map_err(|e| Error::Config(format!("invalid API base: {e}")))?
                .upload_uri(endpoints.upload.as_str())
                .map_err(|e| Error::Config(format!("invalid upload base: {e}")))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent(concat!("prmerge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints,
            token: auth.token.clone(),
            http_client,
        })
    }

    /// Endpoints this service talks to
    pub const fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Build `repos/{owner}/{repo}/...` under the API base
    ///
    /// Each segment is percent-encoded, so `#`, `%` and `?` in a branch
    /// name stay part of the path.
    fn repo_url<'s>(
        &self,
        repo: &RepoId,
        path: impl IntoIterator<Item = &'s str>,
    ) -> Result<Url> {
        let mut url = self.endpoints.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Internal(format!("API base {} cannot hold a path", self.endpoints.base))
            })?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.repo.as_str()])
            .extend(path);
        Ok(url)
    }

    fn raw_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

/// Convert an octocrab PR into our snapshot
fn snapshot_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number: pr.number,
        merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
        mergeable: pr.mergeable,
        merge_commit_sha: pr.merge_commit_sha.clone(),
        head_ref: pr.head.ref_field.clone(),
        is_draft: pr.draft.unwrap_or(false),
    }
}

fn review_state_from_octocrab(state: Option<&OctoReviewState>) -> ReviewState {
    match state {
        Some(OctoReviewState::Approved) => ReviewState::Approved,
        Some(OctoReviewState::ChangesRequested) => ReviewState::ChangesRequested,
        Some(OctoReviewState::Commented) => ReviewState::Commented,
        Some(OctoReviewState::Dismissed) => ReviewState::Dismissed,
        Some(OctoReviewState::Pending) => ReviewState::Pending,
        // ReviewState is non-exhaustive
        Some(other) => ReviewState::Other(platform_spelling(other)),
        None => ReviewState::Other("UNKNOWN".to_string()),
    }
}

/// The state as GitHub spells it on the wire, e.g. `CHANGES_REQUESTED`
fn platform_spelling(state: &OctoReviewState) -> String {
    match serde_json::to_value(state) {
        Ok(serde_json::Value::String(name)) => name,
        _ => format!("{state:?}").to_uppercase(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pull_request(
        &self,
        repo: &RepoId,
        pr_number: u64,
    ) -> Result<PullRequestSnapshot> {
        debug!(%repo, pr_number, "getting PR");
        let pr = self
            .client
            .pulls(&repo.owner, &repo.repo)
            .get(pr_number)
            .await?;

        let snapshot = snapshot_from_octocrab(&pr);
        debug!(
            pr_number,
            merged = snapshot.merged,
            mergeable = ?snapshot.mergeable,
            head_ref = %snapshot.head_ref,
            "got PR"
        );
        Ok(snapshot)
    }

    async fn get_combined_status(&self, repo: &RepoId, sha: &str) -> Result<CombinedStatus> {
        debug!(%repo, sha, "getting combined status");
        let url = self.repo_url(repo, ["commits", sha, "status"])?;

        let response = self
            .raw_request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch commit status: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "commit status for {sha} returned {status}: {body}"
            )));
        }

        let combined: CombinedStatus = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse commit status: {e}")))?;

        debug!(state = %combined.state, count = combined.total_count, "got combined status");
        Ok(combined)
    }

    async fn list_reviews(&self, repo: &RepoId, pr_number: u64) -> Result<Vec<Review>> {
        debug!(%repo, pr_number, "listing reviews");
        let page = self
            .client
            .pulls(&repo.owner, &repo.repo)
            .list_reviews(pr_number)
            .send()
            .await?;
        let reviews = self.client.all_pages(page).await?;

        let result: Vec<Review> = reviews
            .into_iter()
            .map(|r| Review {
                id: r.id.0,
                state: review_state_from_octocrab(r.state.as_ref()),
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed reviews");
        Ok(result)
    }

    async fn merge_pull_request(&self, repo: &RepoId, pr_number: u64) -> Result<MergeResult> {
        debug!(%repo, pr_number, "merging PR");

        // No title or message: the platform default commit message applies
        let result = self
            .client
            .pulls(&repo.owner, &repo.repo)
            .merge(pr_number)
            .send()
            .await?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge call complete"
        );
        Ok(merge_result)
    }

    async fn delete_ref(&self, repo: &RepoId, ref_name: &str) -> Result<()> {
        #[derive(Deserialize)]
        struct ApiMessage {
            message: String,
        }

        debug!(%repo, ref_name, "deleting ref");
        let url = self.repo_url(repo, ["git", "refs"].into_iter().chain(ref_name.split('/')))?;

        let response = self
            .raw_request(reqwest::Method::DELETE, url)
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to delete ref {ref_name}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(ref_name, "deleted ref");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|m| m.message)
            .unwrap_or(body);

        // A bare 404 is also what a token without access to the repo gets,
        // so only the explicit missing-ref answer counts as "already gone"
        if status == StatusCode::UNPROCESSABLE_ENTITY && message == MISSING_REF_MESSAGE {
            return Err(Error::RefNotFound(ref_name.to_string()));
        }

        Err(Error::GitHubApi(format!(
            "delete ref {ref_name} returned {status}: {message}"
        )))
    }
}
