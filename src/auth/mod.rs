//! Authentication for GitHub
//!
//! Tokens come from the environment; refreshing them is the caller's job.

mod github;

pub use github::{GITHUB_TOKEN_VARS, GitHubAuthConfig, get_github_auth};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from environment variable
    EnvVar,
    /// Token passed in explicitly (e.g. from a CLI flag)
    Explicit,
}
