//! Endpoint and throttle configuration

use crate::error::{Error, Result};
use std::env;
use std::time::Duration;
use url::Url;

/// Environment variable holding an alternate API base (GitHub Enterprise)
pub const GITHUB_URL_VAR: &str = "GITHUB_URL";

const DEFAULT_API_BASE: &str = "https://api.github.com/";
const DEFAULT_UPLOAD_BASE: &str = "https://uploads.github.com/";

/// Default spacing between hosting API calls
pub const DEFAULT_API_INTERVAL: Duration = Duration::from_secs(1);

/// Default spacing between merges handed to CI
pub const DEFAULT_MERGE_INTERVAL: Duration = Duration::from_secs(30);

/// Primary and upload endpoints of the hosting API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Base for REST calls, always ends in `/`
    pub base: Url,
    /// Base for uploads
    pub upload: Url,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            upload: Url::parse(DEFAULT_UPLOAD_BASE).expect("default upload base is a valid URL"),
        }
    }
}

impl ApiEndpoints {
    /// Derive both endpoints from an alternate base URL
    ///
    /// The base gets a trailing slash if it lacks one; the upload endpoint is
    /// the base with `upload/` appended.
    pub fn from_base(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };

        let base = Url::parse(&normalized)
            .map_err(|e| Error::Config(format!("invalid {GITHUB_URL_VAR} '{raw}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid {GITHUB_URL_VAR} '{raw}': not a base URL"
            )));
        }
        let upload = base
            .join("upload/")
            .map_err(|e| Error::Config(format!("invalid upload URL for '{raw}': {e}")))?;

        Ok(Self { base, upload })
    }

    /// Read `GITHUB_URL`, falling back to github.com when unset or empty
    pub fn from_env() -> Result<Self> {
        match env::var(GITHUB_URL_VAR) {
            Ok(raw) if !raw.trim().is_empty() => Self::from_base(&raw),
            _ => Ok(Self::default()),
        }
    }

    /// Whether these are the public github.com endpoints
    pub fn is_default(&self) -> bool {
        self.base.as_str() == DEFAULT_API_BASE
    }
}

/// Permit intervals for the two shared rate limiters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Minimum spacing between hosting API calls
    pub api_interval: Duration,
    /// Minimum spacing between merge submissions
    pub merge_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            api_interval: DEFAULT_API_INTERVAL,
            merge_interval: DEFAULT_MERGE_INTERVAL,
        }
    }
}

impl ThrottleConfig {
    /// Reject zero intervals, which tokio intervals cannot represent
    pub fn validate(&self) -> Result<()> {
        if self.api_interval.is_zero() {
            return Err(Error::Config("API interval must be non-zero".to_string()));
        }
        if self.merge_interval.is_zero() {
            return Err(Error::Config("merge interval must be non-zero".to_string()));
        }
        Ok(())
    }
}
