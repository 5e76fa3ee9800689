//! GitHub authentication

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use std::env;

/// Environment variables checked for a token, in priority order
pub const GITHUB_TOKEN_VARS: [&str; 3] = ["GITHUB_API_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

impl GitHubAuthConfig {
    /// Wrap a token supplied directly by the caller
    pub fn explicit(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: AuthSource::Explicit,
        }
    }
}

/// Get GitHub authentication
///
/// Priority:
/// 1. `GITHUB_API_TOKEN`
/// 2. `GITHUB_TOKEN`
/// 3. `GH_TOKEN`
///
/// Empty values are skipped.
pub fn get_github_auth() -> Result<GitHubAuthConfig> {
    for var in GITHUB_TOKEN_VARS {
        if let Ok(token) = env::var(var) {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(GitHubAuthConfig {
                    token: token.to_string(),
                    source: AuthSource::EnvVar,
                });
            }
        }
    }

    Err(Error::Auth(
        "No GitHub token found. Set GITHUB_API_TOKEN (or GITHUB_TOKEN)".to_string(),
    ))
}
