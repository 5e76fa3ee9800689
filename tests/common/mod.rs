//! Shared test utilities

#![allow(dead_code)]

mod limiters;
mod mock_platform;

pub use limiters::{BlockingLimiter, CountingLimiter};
pub use mock_platform::{MockPlatformService, PlatformCall};

use prmerge::types::MergeRequestInput;

pub const ORG: &str = "Clever";
pub const REPO: &str = "microplane";
pub const PR_NUMBER: u64 = 123;
pub const HEAD_SHA: &str = "head0123";
pub const HEAD_REF: &str = "mp-change";
pub const MERGE_SHA: &str = "merge456";

/// Input with both readiness requirements enabled
pub fn strict_input() -> MergeRequestInput {
    MergeRequestInput {
        org: ORG.to_string(),
        repo: REPO.to_string(),
        pr_number: PR_NUMBER,
        commit_sha: HEAD_SHA.to_string(),
        require_review_approval: true,
        require_build_success: true,
    }
}

/// Input with neither readiness requirement
pub fn lenient_input() -> MergeRequestInput {
    MergeRequestInput {
        require_review_approval: false,
        require_build_success: false,
        ..strict_input()
    }
}
